//! Lint report generation
//!
//! Collects per-rule outcomes for a run and renders them as text, JSON
//! or Markdown.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;

use crate::lint::rule::{FixResult, RuleResult, RuleViolation, Suggestion};

/// Report output format
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum LintReportFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

/// Report for one lint run over a repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintReport {
    /// Outcome per rule, in registration order
    pub results: IndexMap<String, RuleOutcome>,
    /// Global errors (not tied to a rule)
    pub errors: Vec<String>,
    /// Summary statistics
    pub summary: LintSummary,
    /// Whether the report has been finalized
    #[serde(skip)]
    finalized: bool,
}

/// Outcome for a single rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RuleOutcome {
    /// Rule check result
    Checked(RuleResult),
    /// Error occurred while running the rule
    Error(String),
    /// Fix was applied
    Fixed(FixResult),
    /// Dry-run fix preview
    DryRunFix(Vec<RuleViolation>),
}

/// Summary statistics for the report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintSummary {
    /// Total rules run
    pub total_checks: usize,
    /// Checks that passed
    pub passed_checks: usize,
    /// Checks that failed
    pub failed_checks: usize,
    /// Total violations found
    pub total_violations: usize,
    /// Total suggestions emitted
    pub total_suggestions: usize,
    /// Violations by severity
    pub violations_by_severity: HashMap<String, usize>,
    /// Fixable violations
    pub fixable_violations: usize,
    /// Pass rate as percentage
    pub pass_rate: f64,
}

impl LintReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            results: IndexMap::new(),
            errors: Vec::new(),
            summary: LintSummary::default(),
            finalized: false,
        }
    }

    /// Add a rule result
    pub fn add_result(&mut self, rule: &str, result: RuleResult) {
        self.results
            .insert(rule.to_string(), RuleOutcome::Checked(result));
    }

    /// Add a rule error
    pub fn add_error(&mut self, rule: &str, error: String) {
        self.results.insert(rule.to_string(), RuleOutcome::Error(error));
    }

    /// Add a global error
    pub fn add_global_error(&mut self, error: String) {
        self.errors.push(error);
    }

    /// Add a fix result
    pub fn add_fix_result(&mut self, rule: &str, result: FixResult) {
        self.results
            .insert(rule.to_string(), RuleOutcome::Fixed(result));
    }

    /// Add a dry-run fix preview
    pub fn add_dry_run_fix(&mut self, rule: &str, violations: &[RuleViolation]) {
        self.results
            .insert(rule.to_string(), RuleOutcome::DryRunFix(violations.to_vec()));
    }

    /// Finalize the report and compute summary
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }

        let mut passed_checks = 0;
        let mut failed_checks = 0;
        let mut total_violations = 0;
        let mut total_suggestions = 0;
        let mut fixable_violations = 0;
        let mut violations_by_severity: HashMap<String, usize> = HashMap::new();

        for outcome in self.results.values() {
            match outcome {
                RuleOutcome::Checked(result) => {
                    total_suggestions += result.suggestions.len();
                    if result.passed {
                        passed_checks += 1;
                    } else {
                        failed_checks += 1;
                        for violation in &result.violations {
                            total_violations += 1;
                            if violation.fixable {
                                fixable_violations += 1;
                            }
                            *violations_by_severity
                                .entry(violation.severity.to_string())
                                .or_default() += 1;
                        }
                    }
                }
                RuleOutcome::Error(_) => {
                    failed_checks += 1;
                }
                RuleOutcome::Fixed(result) => {
                    if result.success {
                        passed_checks += 1;
                    } else {
                        failed_checks += 1;
                    }
                }
                RuleOutcome::DryRunFix(violations) => {
                    failed_checks += 1;
                    total_violations += violations.len();
                    for violation in violations {
                        if violation.fixable {
                            fixable_violations += 1;
                        }
                    }
                }
            }
        }

        let total_checks = self.results.len();
        let pass_rate = if total_checks > 0 {
            (passed_checks as f64 / total_checks as f64) * 100.0
        } else {
            100.0
        };

        self.summary = LintSummary {
            total_checks,
            passed_checks,
            failed_checks,
            total_violations,
            total_suggestions,
            violations_by_severity,
            fixable_violations,
            pass_rate,
        };

        self.finalized = true;
    }

    /// All violations as (rule, violation) pairs, in rule order
    pub fn violations(&self) -> Vec<(&str, &RuleViolation)> {
        let mut violations = Vec::new();
        for (rule, outcome) in &self.results {
            if let RuleOutcome::Checked(result) = outcome {
                for violation in &result.violations {
                    violations.push((rule.as_str(), violation));
                }
            }
        }
        violations
    }

    /// All suggestions as (rule, suggestion) pairs, in rule order
    pub fn suggestions(&self) -> Vec<(&str, &Suggestion)> {
        let mut suggestions = Vec::new();
        for (rule, outcome) in &self.results {
            if let RuleOutcome::Checked(result) = outcome {
                for suggestion in &result.suggestions {
                    suggestions.push((rule.as_str(), suggestion));
                }
            }
        }
        suggestions
    }

    /// Check if the run found no violations or errors
    pub fn is_compliant(&self) -> bool {
        self.summary.failed_checks == 0 && self.errors.is_empty()
    }

    /// Format as text: summary and per-rule status. Violation details
    /// are rendered by the caller from `violations()`, which keeps them
    /// on standard error in the CLI.
    pub fn format_text(&self) -> String {
        let mut out = String::new();

        writeln!(out, "REPOSITORY LINT REPORT").unwrap();
        writeln!(out, "======================\n").unwrap();

        writeln!(
            out,
            "Checks: {}/{} passing ({:.1}%)",
            self.summary.passed_checks, self.summary.total_checks, self.summary.pass_rate
        )
        .unwrap();
        writeln!(out, "Violations: {}", self.summary.total_violations).unwrap();
        if self.summary.fixable_violations > 0 {
            writeln!(
                out,
                "Fixable: {} ({:.1}%)",
                self.summary.fixable_violations,
                (self.summary.fixable_violations as f64 / self.summary.total_violations as f64)
                    * 100.0
            )
            .unwrap();
        }
        if self.summary.total_suggestions > 0 {
            writeln!(out, "Suggestions: {}", self.summary.total_suggestions).unwrap();
        }
        writeln!(out).unwrap();

        for (rule, outcome) in &self.results {
            let status = match outcome {
                RuleOutcome::Checked(result) if result.passed => "PASS",
                RuleOutcome::Fixed(result) if result.success => "FIXED",
                _ => "FAIL",
            };
            writeln!(
                out,
                "{} {} {}",
                rule,
                ".".repeat(40 - rule.len().min(39)),
                status
            )
            .unwrap();

            match outcome {
                RuleOutcome::Checked(result) => {
                    for suggestion in &result.suggestions {
                        writeln!(out, "  [NOTE] {}", suggestion.message).unwrap();
                    }
                }
                RuleOutcome::Error(error) => {
                    writeln!(out, "  [ERROR] {}", error).unwrap();
                }
                RuleOutcome::Fixed(result) => {
                    writeln!(out, "  [FIXED] {} fixes applied", result.fixed_count).unwrap();
                }
                RuleOutcome::DryRunFix(violations) => {
                    writeln!(
                        out,
                        "  [DRY-RUN] {} violations would be fixed",
                        violations.len()
                    )
                    .unwrap();
                }
            }
        }

        if !self.errors.is_empty() {
            writeln!(out, "\nGlobal Errors:").unwrap();
            for error in &self.errors {
                writeln!(out, "  - {}", error).unwrap();
            }
        }

        out
    }

    /// Format as JSON
    pub fn format_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format as Markdown
    pub fn format_markdown(&self) -> String {
        let mut out = String::new();

        writeln!(out, "# Repository Lint Report\n").unwrap();

        writeln!(out, "## Summary\n").unwrap();
        writeln!(out, "| Metric | Value |").unwrap();
        writeln!(out, "|--------|-------|").unwrap();
        writeln!(
            out,
            "| Checks Passing | {}/{} ({:.1}%) |",
            self.summary.passed_checks, self.summary.total_checks, self.summary.pass_rate
        )
        .unwrap();
        writeln!(
            out,
            "| Total Violations | {} |",
            self.summary.total_violations
        )
        .unwrap();
        writeln!(
            out,
            "| Fixable Violations | {} |",
            self.summary.fixable_violations
        )
        .unwrap();
        writeln!(out).unwrap();

        writeln!(out, "## Results by Rule\n").unwrap();

        for (rule, outcome) in &self.results {
            match outcome {
                RuleOutcome::Checked(result) => {
                    if result.passed {
                        writeln!(out, "- ✅ **{}**: Passed", rule).unwrap();
                    } else {
                        writeln!(
                            out,
                            "- ❌ **{}**: {} violations",
                            rule,
                            result.violations.len()
                        )
                        .unwrap();
                        for violation in &result.violations {
                            writeln!(out, "  - `{}`: {}", violation.code, violation.message)
                                .unwrap();
                        }
                    }
                    for suggestion in &result.suggestions {
                        writeln!(out, "  - 💡 {}", suggestion.message).unwrap();
                    }
                }
                RuleOutcome::Error(error) => {
                    writeln!(out, "- ⚠️ **{}**: Error - {}", rule, error).unwrap();
                }
                RuleOutcome::Fixed(result) => {
                    writeln!(
                        out,
                        "- 🔧 **{}**: {} fixes applied",
                        rule, result.fixed_count
                    )
                    .unwrap();
                }
                RuleOutcome::DryRunFix(violations) => {
                    writeln!(
                        out,
                        "- 🔍 **{}**: {} violations would be fixed",
                        rule,
                        violations.len()
                    )
                    .unwrap();
                }
            }
        }
        writeln!(out).unwrap();

        out
    }

    /// Format report based on format type
    pub fn format(&self, format: LintReportFormat) -> String {
        match format {
            LintReportFormat::Text => self.format_text(),
            LintReportFormat::Json => self.format_json(),
            LintReportFormat::Markdown => self.format_markdown(),
        }
    }
}

impl Default for LintReport {
    fn default() -> Self {
        Self::new()
    }
}
