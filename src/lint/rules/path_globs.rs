//! Change Path Glob Rule
//!
//! Ensures every glob listed under a `changes` clause in the CI
//! configuration matches at least one file in the repository, catching
//! stale patterns left behind by refactors.

use std::collections::BTreeSet;
use std::path::Path;

use crate::ci;
use crate::config::CiSettings;
use crate::lint::rule::{LintRule, RuleCategory, RuleResult, RuleViolation};
use crate::lint::LintContext;

/// Stale change path glob rule
#[derive(Debug)]
pub struct PathGlobRule {
    settings: CiSettings,
}

impl PathGlobRule {
    /// Create the rule from the `ci` config section
    pub fn new(settings: CiSettings) -> Self {
        Self { settings }
    }
}

/// Collect every glob under a `changes` key, in both the short list
/// form and the long `paths` form, recursing into nested structures.
fn collect_change_paths(value: &serde_yaml::Value, out: &mut BTreeSet<String>) {
    match value {
        serde_yaml::Value::Mapping(mapping) => {
            for (key, entry) in mapping {
                if key.as_str() == Some("changes") {
                    collect_globs(entry, out);
                }
                collect_change_paths(entry, out);
            }
        }
        serde_yaml::Value::Sequence(items) => {
            for item in items {
                collect_change_paths(item, out);
            }
        }
        _ => {}
    }
}

fn collect_globs(changes: &serde_yaml::Value, out: &mut BTreeSet<String>) {
    let items = match changes {
        serde_yaml::Value::Sequence(items) => Some(items),
        serde_yaml::Value::Mapping(spec) => {
            spec.get("paths").and_then(serde_yaml::Value::as_sequence)
        }
        _ => None,
    };
    let Some(items) = items else {
        return;
    };
    for item in items {
        if let Some(pattern) = item.as_str() {
            out.insert(pattern.to_string());
        }
    }
}

impl LintRule for PathGlobRule {
    fn id(&self) -> &str {
        "change-path-globs"
    }

    fn description(&self) -> &str {
        "Ensures change path globs in the CI configuration match existing files"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Ci
    }

    fn check(&self, ctx: &LintContext) -> anyhow::Result<RuleResult> {
        let entry_point = Path::new(&self.settings.entry_point);
        let merged = ci::resolve::resolve_config(&ctx.root, entry_point)?;

        let mut patterns = BTreeSet::new();
        collect_change_paths(&serde_yaml::Value::Mapping(merged), &mut patterns);

        let mut violations = Vec::new();
        for pattern in &patterns {
            let target = ctx.root.join(pattern);
            let found = match glob::glob(&target.to_string_lossy()) {
                Ok(mut paths) => paths.any(|hit| hit.is_ok()),
                Err(_) => false,
            };
            if !found {
                violations.push(RuleViolation::new(
                    "GLOB-001",
                    format!("no files found for path {pattern}"),
                ));
            }
        }

        Ok(RuleResult::from_parts(violations, Vec::new()))
    }
}
