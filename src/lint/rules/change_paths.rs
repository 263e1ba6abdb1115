//! Change Path Rule
//!
//! Ensures end-to-end test jobs declare a `changes` rule with at least
//! one path outside the test tree, so they are skipped on test-only
//! changes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::ci;
use crate::config::CiSettings;
use crate::lint::rule::{FixResult, LintRule, RuleCategory, RuleResult, RuleViolation, Suggestion};
use crate::lint::LintContext;

/// Change path rule for test jobs
#[derive(Debug)]
pub struct ChangePathRule {
    settings: CiSettings,
}

impl ChangePathRule {
    /// Create the rule from the `ci` config section
    pub fn new(settings: CiSettings) -> Self {
        Self { settings }
    }

    /// Expand the configured job file list. Entries with glob
    /// metacharacters match zero or more files; literal entries are
    /// kept as-is so a missing file fails the later read.
    fn expand_job_files(&self, root: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in &self.settings.job_files {
            if entry.contains(['*', '?', '[']) {
                let pattern = root.join(entry);
                for hit in glob::glob(&pattern.to_string_lossy())? {
                    let path = hit?;
                    files.push(path.strip_prefix(root).unwrap_or(&path).to_path_buf());
                }
            } else {
                files.push(PathBuf::from(entry));
            }
        }
        Ok(files)
    }
}

impl LintRule for ChangePathRule {
    fn id(&self) -> &str {
        "job-change-paths"
    }

    fn description(&self) -> &str {
        "Ensures test jobs restrict when they run via change path rules"
    }

    fn help(&self) -> Option<&str> {
        Some(
            "Test jobs must declare a rule of the form\n\
             rules:\n\
               - changes:\n\
                   paths:\n\
                     - <path>\n\
             with at least one path outside test/.",
        )
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Ci
    }

    fn check(&self, ctx: &LintContext) -> anyhow::Result<RuleResult> {
        let job_files = self.expand_job_files(&ctx.root)?;
        if job_files.is_empty() {
            return Ok(
                RuleResult::pass().with_context("no job files matched the configured patterns")
            );
        }
        let origins = ci::resolve::load_job_origins(&ctx.root, &job_files)?;
        let test_jobs: Vec<(String, PathBuf)> = origins
            .into_iter()
            .filter(|(name, _)| !ci::is_hidden_job(name))
            .collect();

        let entry_point = Path::new(&self.settings.entry_point);
        let merged = ci::resolve::resolve_config(&ctx.root, entry_point)?;
        let config = ci::CiConfig::from_mapping(&merged)?;

        let allow_list: HashSet<String> = self.settings.allow_list.iter().cloned().collect();
        let report = ci::change_paths::validate(&config, &test_jobs, &allow_list)?;

        let mut violations = Vec::new();
        for (file, jobs) in &report.violations {
            violations.push(
                RuleViolation::new(
                    "JOB-001",
                    format!(
                        "tests without required change paths rule: {}",
                        jobs.join(", ")
                    ),
                )
                .with_location(file.display().to_string()),
            );
        }

        let mut suggestions = Vec::new();
        for (file, jobs) in &report.allowed {
            suggestions.push(
                Suggestion::new(format!(
                    "allow-listed tests without change paths: {}",
                    jobs.join(", ")
                ))
                .with_location(file.display().to_string()),
            );
        }

        let result = RuleResult::from_parts(violations, suggestions);
        if result.passed {
            Ok(result)
        } else {
            Ok(result.with_context(
                "Some tests do not contain required change paths rule, \
                 they must contain at least one non-test path.",
            ))
        }
    }

    fn can_fix(&self) -> bool {
        false // picking the right change paths needs knowledge of the job
    }

    fn fix(&self, _ctx: &LintContext) -> anyhow::Result<FixResult> {
        Ok(FixResult::failure(
            "Auto-fix not supported for change path rules",
        ))
    }
}
