//! Change-path rule validation
//!
//! Jobs defined in the e2e job files must carry a `rules:` entry whose
//! `changes:` clause names at least one path outside the test tree.
//! Jobs without one are reported per defining file unless allow-listed.

use std::collections::HashSet;
use std::path::PathBuf;

use indexmap::IndexMap;

use crate::ci::{CiConfig, JobRule};

/// Prefixes that mark a change path as test-tree only.
pub const TEST_ONLY_PREFIXES: &[&str] = &["test/", "./test/", "test\\", ".\\test\\"];

/// A job indexed from the job files is missing from the resolved pipeline.
/// The two views are built from the same tree, so a gap means the entry
/// point no longer pulls in that job file.
#[derive(Debug, thiserror::Error)]
#[error("job '{job}' is defined in {} but missing from the resolved pipeline", .file.display())]
pub struct ConfigInconsistency {
    pub job: String,
    pub file: PathBuf,
}

/// Outcome of a change-path validation run. Jobs are grouped by the file
/// that defines them, both maps keeping first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangePathReport {
    /// Jobs lacking a qualifying rule.
    pub violations: IndexMap<PathBuf, Vec<String>>,
    /// Allow-listed jobs lacking a qualifying rule.
    pub allowed: IndexMap<PathBuf, Vec<String>>,
}

impl ChangePathReport {
    pub fn is_compliant(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violation_count(&self) -> usize {
        self.violations.values().map(Vec::len).sum()
    }

    pub fn allowed_count(&self) -> usize {
        self.allowed.values().map(Vec::len).sum()
    }
}

/// Whether a rule entry satisfies the change-path requirement: the long
/// `changes:` form with at least one path outside the test tree. All
/// other rule shapes never qualify.
pub fn is_valid_change_rule(rule: &JobRule) -> bool {
    let JobRule::Clauses(clauses) = rule else {
        return false;
    };
    let Some(changes) = &clauses.changes else {
        return false;
    };
    let Some(paths) = changes.paths() else {
        return false;
    };
    paths.iter().any(|path| {
        !TEST_ONLY_PREFIXES
            .iter()
            .any(|prefix| path.starts_with(prefix))
    })
}

/// Check every test job for a qualifying change rule.
///
/// `test_jobs` pairs each job name with its defining file, in encounter
/// order; that order carries through to the report. A test job absent
/// from `config` aborts with [`ConfigInconsistency`].
pub fn validate(
    config: &CiConfig,
    test_jobs: &[(String, PathBuf)],
    allow_list: &HashSet<String>,
) -> Result<ChangePathReport, ConfigInconsistency> {
    let mut report = ChangePathReport::default();
    for (job, file) in test_jobs {
        let Some(definition) = config.get(job) else {
            return Err(ConfigInconsistency {
                job: job.clone(),
                file: file.clone(),
            });
        };
        if definition.rules().iter().any(is_valid_change_rule) {
            continue;
        }
        let bucket = if allow_list.contains(job) {
            &mut report.allowed
        } else {
            &mut report.violations
        };
        bucket.entry(file.clone()).or_default().push(job.clone());
    }
    Ok(report)
}
