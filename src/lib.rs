// Library exports for the revisar repository linter
pub mod ci;
pub mod cli;
pub mod config;
pub mod lint;
pub mod output;
pub mod repo;

// Re-export key types for convenience
pub use ci::change_paths::{ChangePathReport, ConfigInconsistency};
pub use ci::{CiConfig, CiError, JobDefinition};
pub use config::RevisarConfig;
pub use lint::{LintContext, LintEngine, LintReport, LintReportFormat};
