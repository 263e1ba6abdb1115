//! GitLab CI configuration model
//!
//! Typed view over the YAML documents that make up a pipeline definition.
//! Parsing is deliberately permissive: rule entries the schema does not
//! recognize are carried as raw values instead of failing the whole load,
//! since a lint run should report on the config it can read.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Deserialize;

pub mod change_paths;
pub mod resolve;

/// Top-level keys that configure the pipeline rather than define a job.
pub const RESERVED_KEYS: &[&str] = &[
    "after_script",
    "before_script",
    "cache",
    "default",
    "image",
    "include",
    "services",
    "stages",
    "types",
    "variables",
    "workflow",
];

/// Hidden jobs are templates for `extends`, never scheduled.
pub fn is_hidden_job(name: &str) -> bool {
    name.starts_with('.')
}

#[derive(Debug, thiserror::Error)]
pub enum CiError {
    #[error("failed to read {}: {source}", .file.display())]
    Read {
        file: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .file.display())]
    Parse {
        file: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("{} is not a YAML mapping", .file.display())]
    NotAMapping { file: PathBuf },

    #[error("unsupported include {include} in {}: only local includes are resolved", .file.display())]
    UnsupportedInclude { file: PathBuf, include: String },

    #[error("job '{job}' extends unknown job '{parent}'")]
    UnknownExtends { job: String, parent: String },

    #[error("extends cycle detected at job '{job}'")]
    ExtendsCycle { job: String },

    #[error("job '{job}' has a malformed extends clause")]
    InvalidExtends { job: String },

    #[error("job '{job}' is not a valid job definition: {source}")]
    InvalidJob {
        job: String,
        source: serde_yaml::Error,
    },
}

/// A resolved pipeline configuration, keyed by job name in definition order.
#[derive(Debug, Clone, Default)]
pub struct CiConfig {
    pub jobs: IndexMap<String, JobDefinition>,
}

impl CiConfig {
    /// Extract the typed job view from a resolved YAML mapping.
    ///
    /// Reserved keys and non-mapping values are skipped. Hidden jobs are
    /// kept so lookups against `extends` parents still resolve.
    pub fn from_mapping(mapping: &serde_yaml::Mapping) -> Result<Self, CiError> {
        let mut jobs = IndexMap::new();
        for (key, value) in mapping {
            let Some(name) = key.as_str() else {
                continue;
            };
            if RESERVED_KEYS.contains(&name) || !value.is_mapping() {
                continue;
            }
            let job = serde_yaml::from_value(value.clone()).map_err(|source| {
                CiError::InvalidJob {
                    job: name.to_string(),
                    source,
                }
            })?;
            jobs.insert(name.to_string(), job);
        }
        Ok(Self { jobs })
    }

    pub fn get(&self, name: &str) -> Option<&JobDefinition> {
        self.jobs.get(name)
    }
}

/// A single job entry. Keys the linter does not inspect are preserved
/// untyped under `extra`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JobDefinition {
    #[serde(default)]
    pub rules: Option<Vec<JobRule>>,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl JobDefinition {
    /// The job's `rules:` entries, empty when the key is absent or null.
    pub fn rules(&self) -> &[JobRule] {
        self.rules.as_deref().unwrap_or_default()
    }
}

/// One entry of a job's `rules:` sequence.
///
/// GitLab accepts several shapes here. Anything that does not match a
/// known shape is kept as [`JobRule::Other`] rather than rejected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum JobRule {
    /// Bare condition string.
    Condition(String),
    /// Bare boolean, seen in generated pipelines.
    Boolean(bool),
    /// The mapping form with `if:`, `changes:` and `when:` clauses.
    Clauses(RuleClauses),
    /// Any other shape, preserved verbatim.
    Other(serde_yaml::Value),
}

/// The mapping form of a rule entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RuleClauses {
    #[serde(default, rename = "if")]
    pub condition: Option<String>,
    #[serde(default)]
    pub changes: Option<ChangesClause>,
    #[serde(default)]
    pub when: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

/// The `changes:` clause of a rule, in either accepted form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ChangesClause {
    /// Short form: a bare list of glob patterns.
    Globs(Vec<String>),
    /// Long form: a mapping with `paths:` and optional `compare_to:`.
    Spec(ChangesSpec),
}

impl ChangesClause {
    /// Paths from the long form. The short form carries no `paths:` key
    /// and never satisfies the change-rule predicate.
    pub fn paths(&self) -> Option<&[String]> {
        match self {
            ChangesClause::Globs(_) => None,
            ChangesClause::Spec(spec) => spec.paths.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChangesSpec {
    #[serde(default)]
    pub paths: Option<Vec<String>>,
    #[serde(default)]
    pub compare_to: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}
