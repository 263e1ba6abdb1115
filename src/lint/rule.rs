//! Lint rule trait
//!
//! Defines the interface for repository hygiene rules and the result
//! types they produce.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::lint::LintContext;

/// Result of a single rule check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResult {
    /// Whether the rule passed
    pub passed: bool,
    /// List of violations found
    pub violations: Vec<RuleViolation>,
    /// Suggestions for improvement (not violations)
    pub suggestions: Vec<Suggestion>,
    /// Additional context/metadata
    pub context: Option<String>,
}

impl RuleResult {
    /// Create a passing result
    pub fn pass() -> Self {
        Self {
            passed: true,
            violations: Vec::new(),
            suggestions: Vec::new(),
            context: None,
        }
    }

    /// Create a passing result with suggestions
    pub fn pass_with_suggestions(suggestions: Vec<Suggestion>) -> Self {
        Self {
            passed: true,
            violations: Vec::new(),
            suggestions,
            context: None,
        }
    }

    /// Create a failing result with violations
    pub fn fail(violations: Vec<RuleViolation>) -> Self {
        Self {
            passed: false,
            violations,
            suggestions: Vec::new(),
            context: None,
        }
    }

    /// Build a result from collected violations and suggestions; passes
    /// when there are no violations.
    pub fn from_parts(violations: Vec<RuleViolation>, suggestions: Vec<Suggestion>) -> Self {
        Self {
            passed: violations.is_empty(),
            violations,
            suggestions,
            context: None,
        }
    }

    /// Add context to the result
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// A specific violation of a lint rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleViolation {
    /// Violation code (e.g., "JOB-001")
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Severity of the violation
    pub severity: ViolationLevel,
    /// File or location where violation was found
    pub location: Option<String>,
    /// Line number (if applicable)
    pub line: Option<usize>,
    /// Expected value/content
    pub expected: Option<String>,
    /// Actual value/content found
    pub actual: Option<String>,
    /// Whether this violation is auto-fixable
    pub fixable: bool,
}

impl RuleViolation {
    /// Create a new violation
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: ViolationLevel::Error,
            location: None,
            line: None,
            expected: None,
            actual: None,
            fixable: false,
        }
    }

    /// Set the severity
    pub fn with_severity(mut self, severity: ViolationLevel) -> Self {
        self.severity = severity;
        self
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the line number
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Set expected/actual values
    pub fn with_diff(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    /// Mark as fixable
    pub fn fixable(mut self) -> Self {
        self.fixable = true;
        self
    }
}

/// Severity level of a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationLevel {
    /// Informational - not a real violation
    Info,
    /// Warning - should be fixed but not blocking
    Warning,
    /// Error - must be fixed
    Error,
}

impl fmt::Display for ViolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationLevel::Info => write!(f, "INFO"),
            ViolationLevel::Warning => write!(f, "WARN"),
            ViolationLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// A suggestion for improvement (not a violation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Suggestion message
    pub message: String,
    /// Location (if applicable)
    pub location: Option<String>,
}

impl Suggestion {
    /// Create a new suggestion
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    /// Add location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Result of attempting to fix violations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixResult {
    /// Whether all fixes were applied successfully
    pub success: bool,
    /// Number of violations fixed
    pub fixed_count: usize,
    /// Number of violations that couldn't be fixed
    pub failed_count: usize,
    /// Details about each fix attempt
    pub details: Vec<FixDetail>,
}

impl FixResult {
    /// Create a successful fix result
    pub fn success(fixed: usize) -> Self {
        Self {
            success: true,
            fixed_count: fixed,
            failed_count: 0,
            details: Vec::new(),
        }
    }

    /// Create a partial fix result
    pub fn partial(fixed: usize, failed: usize, details: Vec<FixDetail>) -> Self {
        Self {
            success: false,
            fixed_count: fixed,
            failed_count: failed,
            details,
        }
    }

    /// Create a failed fix result
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            fixed_count: 0,
            failed_count: 0,
            details: vec![FixDetail::Error(error.into())],
        }
    }
}

/// Detail about a specific fix attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FixDetail {
    /// Successfully applied fix
    Fixed { code: String, description: String },
    /// Failed to apply fix
    FailedToFix { code: String, reason: String },
    /// General error
    Error(String),
}

/// Trait for repository lint rules
///
/// Implement this trait to create custom rules.
pub trait LintRule: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this rule (e.g., "job-change-paths")
    fn id(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Detailed help text (optional)
    fn help(&self) -> Option<&str> {
        None
    }

    /// Check the repository for violations
    fn check(&self, ctx: &LintContext) -> anyhow::Result<RuleResult>;

    /// Whether this rule can auto-fix violations
    fn can_fix(&self) -> bool {
        false
    }

    /// Attempt to fix violations (if supported)
    fn fix(&self, ctx: &LintContext) -> anyhow::Result<FixResult> {
        let _ = ctx;
        Ok(FixResult::failure("Auto-fix not supported for this rule"))
    }

    /// Category of this rule
    fn category(&self) -> RuleCategory {
        RuleCategory::General
    }
}

/// Category of lint rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleCategory {
    /// General repository hygiene
    General,
    /// CI/CD pipeline configuration
    Ci,
    /// Source code conventions
    Code,
    /// Repository layout and naming
    Repo,
    /// Secret handling
    Secrets,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCategory::General => write!(f, "General"),
            RuleCategory::Ci => write!(f, "CI"),
            RuleCategory::Code => write!(f, "Code"),
            RuleCategory::Repo => write!(f, "Repo"),
            RuleCategory::Secrets => write!(f, "Secrets"),
        }
    }
}
