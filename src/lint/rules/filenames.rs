//! Filename Portability Rule
//!
//! Ensures tracked paths stay checkoutable on Windows: no characters the
//! Win32 API rejects, and no path that overflows the 255-character limit
//! once the build workspace prefix is added.

use crate::config::FilenameSettings;
use crate::lint::rule::{LintRule, RuleCategory, RuleResult, RuleViolation};
use crate::lint::LintContext;

/// Characters the Win32 API does not accept in paths
const FORBIDDEN_CHARS: [char; 8] = ['<', '>', ':', '"', '\\', '|', '?', '*'];

/// Filename portability rule
#[derive(Debug)]
pub struct FilenameRule {
    settings: FilenameSettings,
}

impl FilenameRule {
    /// Create the rule from the `filenames` config section
    pub fn new(settings: FilenameSettings) -> Self {
        Self { settings }
    }

    fn is_length_exempt(&self, path: &str) -> bool {
        self.settings
            .length_exempt_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

impl LintRule for FilenameRule {
    fn id(&self) -> &str {
        "filenames"
    }

    fn description(&self) -> &str {
        "Ensures tracked paths contain no illegal characters and fit the Windows length limit"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Repo
    }

    fn check(&self, ctx: &LintContext) -> anyhow::Result<RuleResult> {
        let mut violations = Vec::new();
        for rel in &ctx.files {
            let path = rel.to_string_lossy();

            // On Windows such a file could not have been checked out
            // in the first place.
            if !cfg!(windows) && path.contains(&FORBIDDEN_CHARS[..]) {
                violations.push(RuleViolation::new(
                    "FN-001",
                    format!("illegal character in path {path}"),
                ));
            }

            let length = self.settings.prefix_length + path.chars().count();
            if !self.is_length_exempt(&path) && length > self.settings.max_length {
                let over = length - self.settings.max_length;
                violations.push(RuleViolation::new(
                    "FN-002",
                    format!("path {path} is too long ({over} characters too many)"),
                ));
            }
        }
        Ok(RuleResult::from_parts(violations, Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn context(files: &[&str]) -> LintContext {
        LintContext {
            root: PathBuf::from("."),
            files: files.iter().map(PathBuf::from).collect(),
        }
    }

    #[test]
    fn test_filename_rule_creation() {
        let rule = FilenameRule::new(FilenameSettings::default());
        assert_eq!(rule.id(), "filenames");
        assert_eq!(rule.category(), RuleCategory::Repo);
        assert!(!rule.can_fix());
    }

    #[test]
    fn test_clean_paths_pass() {
        let rule = FilenameRule::new(FilenameSettings::default());
        let result = rule
            .check(&context(&["pkg/util/mod.go", "tasks/lint.py"]))
            .unwrap();
        assert!(result.passed);
    }

    #[cfg(not(windows))]
    #[test]
    fn test_illegal_character_flagged() {
        let rule = FilenameRule::new(FilenameSettings::default());
        let result = rule.check(&context(&["docs/what?.md"])).unwrap();
        assert!(!result.passed);
        assert_eq!(result.violations[0].code, "FN-001");
        assert!(result.violations[0].message.contains("docs/what?.md"));
    }

    #[test]
    fn test_long_path_flagged_with_overflow_count() {
        // 160 prefix + 100 chars = 260, five over the 255 limit.
        let long = "x".repeat(100);
        let rule = FilenameRule::new(FilenameSettings::default());
        let result = rule.check(&context(&[&long])).unwrap();
        assert!(!result.passed);
        assert_eq!(result.violations[0].code, "FN-002");
        assert!(result.violations[0]
            .message
            .contains("(5 characters too many)"));
    }

    #[test]
    fn test_length_boundary_passes() {
        // 160 + 95 lands exactly on the limit.
        let edge = "x".repeat(95);
        let rule = FilenameRule::new(FilenameSettings::default());
        let result = rule.check(&context(&[&edge])).unwrap();
        assert!(result.passed);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 96 two-byte characters, one character over the limit.
        let long = "é".repeat(96);
        let rule = FilenameRule::new(FilenameSettings::default());
        let result = rule.check(&context(&[&long])).unwrap();
        assert_eq!(result.violations.len(), 1);
        assert!(result.violations[0]
            .message
            .contains("(1 characters too many)"));
    }

    #[test]
    fn test_exempt_prefix_skips_length_check() {
        let long = format!("test/regression/{}", "x".repeat(100));
        let settings = FilenameSettings {
            length_exempt_prefixes: vec!["test/regression".to_string()],
            ..FilenameSettings::default()
        };
        let rule = FilenameRule::new(settings);
        let result = rule.check(&context(&[&long])).unwrap();
        assert!(result.passed);
    }

    #[cfg(not(windows))]
    #[test]
    fn test_path_can_collect_both_violations() {
        let long = format!("{}?", "x".repeat(100));
        let rule = FilenameRule::new(FilenameSettings::default());
        let result = rule.check(&context(&[&long])).unwrap();
        assert_eq!(result.violations.len(), 2);
    }
}
