//! Secret Wrapper Rule
//!
//! Ensures CI scripts retrieve secrets through the `fetch_secret`
//! wrapper with parameter names supplied as environment variables,
//! never by calling `aws ssm get-parameter` directly or hardcoding
//! parameter names.

use std::fmt;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::config::{SecretsMode, SecretsSettings};
use crate::lint::rule::{LintRule, RuleCategory, RuleResult, RuleViolation};
use crate::lint::LintContext;

static DIRECT_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.+ssm get-parameter.+--name +(?P<param>[^ ]+).*$")
        .expect("valid direct call pattern")
});

// The leading letter of the script name is left out so the pattern also
// matches Windows paths, where `\f` mangles the separator.
static WRAPPER_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^.+etch_secret.(sh|ps1)["]? (-parameterName )?(?P<param>[^ )]+).*$"#)
        .expect("valid wrapper call pattern")
});

/// One secret retrieval found in a scanned file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretCall {
    /// Repo-relative file containing the call
    pub file: PathBuf,
    /// Zero-based line number of the call
    pub line: usize,
    /// Whether the call goes through the wrapper script
    pub with_wrapper: bool,
    /// Whether the parameter name comes from an environment variable
    pub with_env_var: bool,
}

impl SecretCall {
    /// What the author should change, depending on which half of the
    /// convention the call already follows.
    pub fn advice(&self) -> String {
        let mut parts = Vec::new();
        if !self.with_wrapper {
            parts.push("Please use the dedicated `fetch_secret.(sh|ps1)`.");
        }
        if !self.with_env_var {
            parts.push("Save your parameter name as environment variable in .gitlab-ci.yml file.");
        }
        parts.join(" ")
    }
}

impl fmt::Display for SecretCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}. {}",
            self.file.display(),
            self.line + 1,
            self.advice()
        )
    }
}

fn is_env_reference(param: &str) -> bool {
    param.starts_with('$') || param.contains("os.environ")
}

fn strip_quotes(param: &str) -> String {
    param.replace(['"', '\''], "")
}

/// Collect every secret retrieval in one file. Non-UTF-8 files carry
/// no CI scripts and are skipped.
fn scan_file(path: &Path, rel: &Path) -> Vec<SecretCall> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let mut calls = Vec::new();
    for (nb, line) in content.lines().enumerate() {
        let line = line.trim();
        if let Some(captures) = DIRECT_CALL.captures(line) {
            let param = strip_quotes(&captures["param"]);
            calls.push(SecretCall {
                file: rel.to_path_buf(),
                line: nb,
                with_wrapper: false,
                with_env_var: is_env_reference(&param),
            });
        }
        if let Some(captures) = WRAPPER_CALL.captures(line) {
            let param = strip_quotes(&captures["param"]);
            if !is_env_reference(&param) {
                calls.push(SecretCall {
                    file: rel.to_path_buf(),
                    line: nb,
                    with_wrapper: true,
                    with_env_var: false,
                });
            }
        }
    }
    calls
}

/// Secret wrapper rule
#[derive(Debug)]
pub struct SecretWrapperRule {
    settings: SecretsSettings,
}

impl SecretWrapperRule {
    /// Create the rule from the `secrets` config section
    pub fn new(settings: SecretsSettings) -> Self {
        Self { settings }
    }

    fn in_scanned_folder(&self, rel: &Path) -> bool {
        let path = rel.to_string_lossy();
        self.settings
            .folders
            .iter()
            .any(|folder| path.starts_with(folder.as_str()))
    }
}

impl LintRule for SecretWrapperRule {
    fn id(&self) -> &str {
        "secret-wrappers"
    }

    fn description(&self) -> &str {
        "Ensures secrets are fetched through the wrapper script with env var parameter names"
    }

    fn help(&self) -> Option<&str> {
        Some(
            "Call fetch_secret.(sh|ps1) with the parameter name stored as an\n\
             environment variable in .gitlab-ci.yml, never aws ssm get-parameter.",
        )
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Secrets
    }

    fn check(&self, ctx: &LintContext) -> anyhow::Result<RuleResult> {
        let mut calls = Vec::new();
        for rel in &ctx.files {
            if !self.in_scanned_folder(rel) {
                continue;
            }
            calls.extend(scan_file(&ctx.absolute(rel), rel));
        }

        let flagged: Vec<&SecretCall> = match self.settings.mode {
            SecretsMode::All => calls.iter().collect(),
            SecretsMode::Env => calls.iter().filter(|call| !call.with_env_var).collect(),
            SecretsMode::Wrapper => calls.iter().filter(|call| !call.with_wrapper).collect(),
        };

        let violations: Vec<RuleViolation> = flagged
            .into_iter()
            .map(|call| {
                let code = if call.with_wrapper {
                    "SEC-002"
                } else {
                    "SEC-001"
                };
                RuleViolation::new(code, call.to_string())
            })
            .collect();

        let result = RuleResult::from_parts(violations, Vec::new());
        if result.passed {
            Ok(result)
        } else {
            Ok(result
                .with_context("Files contain unexpected syntax for aws ssm get-parameter."))
        }
    }
}
