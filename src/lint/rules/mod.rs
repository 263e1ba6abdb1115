//! Repository Hygiene Rules
//!
//! Individual rule implementations for checking GitLab CI and source
//! tree conventions.

mod change_paths;
mod copyright;
mod filenames;
mod path_globs;
mod secrets;

pub use change_paths::ChangePathRule;
pub use copyright::CopyrightRule;
pub use filenames::FilenameRule;
pub use path_globs::PathGlobRule;
pub use secrets::SecretWrapperRule;
