//! Repository lint engine
//!
//! Orchestrates hygiene rules over a working tree:
//! - CI change-path coverage for e2e jobs
//! - CI change-path glob liveness
//! - Copyright headers
//! - Filename portability
//! - Secret wrapper usage
//!
//! Rules are registered at engine construction and individually
//! selectable through configuration or the CLI.

pub mod report;
pub mod rule;
pub mod rules;

pub use report::{LintReport, LintReportFormat};
pub use rule::{FixResult, LintRule, RuleResult};

use std::path::{Path, PathBuf};

use crate::config::RevisarConfig;

/// Input to a lint run: the repository root and its tracked files,
/// root-relative and sorted.
#[derive(Debug, Clone)]
pub struct LintContext {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
}

impl LintContext {
    /// Walk `root` and capture its tracked files.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let files = crate::repo::tracked_files(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    /// Absolute path for a tracked file.
    pub fn absolute(&self, rel: &Path) -> PathBuf {
        self.root.join(rel)
    }
}

/// Repository lint engine
///
/// Holds the registered rules and the enable/disable selection.
#[derive(Debug)]
pub struct LintEngine {
    /// Explicitly enabled rules (empty means all)
    enabled_rules: Vec<String>,
    /// Explicitly disabled rules
    disabled_rules: Vec<String>,
    /// Registered rules
    rules: Vec<Box<dyn LintRule>>,
}

impl LintEngine {
    /// Create an engine with the default rule set configured from `config`.
    pub fn new(config: &RevisarConfig) -> Self {
        let mut engine = Self {
            enabled_rules: config.enabled_rules.clone(),
            disabled_rules: config.disabled_rules.clone(),
            rules: Vec::new(),
        };

        engine.register_rule(Box::new(rules::ChangePathRule::new(config.ci.clone())));
        engine.register_rule(Box::new(rules::PathGlobRule::new(config.ci.clone())));
        engine.register_rule(Box::new(rules::CopyrightRule::new(config.copyright.clone())));
        engine.register_rule(Box::new(rules::FilenameRule::new(config.filenames.clone())));
        engine.register_rule(Box::new(rules::SecretWrapperRule::new(
            config.secrets.clone(),
        )));

        engine
    }

    /// Register a custom rule
    pub fn register_rule(&mut self, rule: Box<dyn LintRule>) {
        self.rules.push(rule);
    }

    /// Run all enabled rules
    pub fn check_all(&self, ctx: &LintContext) -> LintReport {
        let mut report = LintReport::new();

        for rule in &self.rules {
            if !self.is_rule_enabled(rule.id()) {
                continue;
            }

            tracing::debug!(rule = rule.id(), "running rule");
            match rule.check(ctx) {
                Ok(result) => {
                    report.add_result(rule.id(), result);
                }
                Err(e) => {
                    report.add_error(rule.id(), e.to_string());
                }
            }
        }

        report.finalize();
        report
    }

    /// Run a specific rule
    pub fn check_rule(&self, rule_id: &str, ctx: &LintContext) -> LintReport {
        let mut report = LintReport::new();

        let Some(rule) = self.rules.iter().find(|r| r.id() == rule_id) else {
            report.add_global_error(format!("Unknown rule: {}", rule_id));
            report.finalize();
            return report;
        };

        match rule.check(ctx) {
            Ok(result) => {
                report.add_result(rule_id, result);
            }
            Err(e) => {
                report.add_error(rule_id, e.to_string());
            }
        }

        report.finalize();
        report
    }

    /// Attempt to fix violations across all fixable rules
    pub fn fix_all(&self, ctx: &LintContext, dry_run: bool) -> LintReport {
        let mut report = LintReport::new();

        for rule in &self.rules {
            if !self.is_rule_enabled(rule.id()) || !rule.can_fix() {
                continue;
            }

            // Check first so clean rules are reported as passing.
            let check_result = match rule.check(ctx) {
                Ok(r) => r,
                Err(e) => {
                    report.add_error(rule.id(), e.to_string());
                    continue;
                }
            };

            if check_result.passed {
                report.add_result(rule.id(), check_result);
                continue;
            }

            if dry_run {
                report.add_dry_run_fix(rule.id(), &check_result.violations);
            } else {
                match rule.fix(ctx) {
                    Ok(fix_result) => {
                        report.add_fix_result(rule.id(), fix_result);
                    }
                    Err(e) => {
                        report.add_error(rule.id(), e.to_string());
                    }
                }
            }
        }

        report.finalize();
        report
    }

    /// Check if a rule is enabled
    fn is_rule_enabled(&self, rule_id: &str) -> bool {
        if self.enabled_rules.is_empty() {
            // All rules enabled by default
            !self.disabled_rules.contains(&rule_id.to_string())
        } else {
            self.enabled_rules.contains(&rule_id.to_string())
        }
    }

    /// Get list of available rules
    pub fn available_rules(&self) -> Vec<(&str, &str)> {
        self.rules
            .iter()
            .map(|r| (r.id(), r.description()))
            .collect()
    }
}
