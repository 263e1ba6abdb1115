//! Copyright Header Rule
//!
//! Ensures source files carry the expected license header, inserting it
//! on request for files that have none at all.

use std::path::Path;

use crate::config::CopyrightSettings;
use crate::lint::rule::{
    FixDetail, FixResult, LintRule, RuleCategory, RuleResult, RuleViolation,
};
use crate::lint::LintContext;

/// Marker identifying generated files, checked near the top of the file
const GENERATED_MARKER: &str = "// Code generated";

/// How many leading lines to scan for the generated marker
const GENERATED_SCAN_LINES: usize = 5;

/// Copyright header rule
#[derive(Debug)]
pub struct CopyrightRule {
    settings: CopyrightSettings,
}

#[derive(Debug, PartialEq)]
enum HeaderStatus {
    Ok,
    Missing,
    Mismatch,
}

impl CopyrightRule {
    /// Create the rule from the `copyright` config section
    pub fn new(settings: CopyrightSettings) -> Self {
        Self { settings }
    }

    fn applies_to(&self, rel: &Path) -> bool {
        let Some(ext) = rel.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        if !self.settings.extensions.iter().any(|e| e == ext) {
            return false;
        }
        let rel_str = rel.to_string_lossy();
        !self.settings.exclude.iter().any(|pattern| {
            glob::Pattern::new(pattern)
                .map(|p| p.matches(&rel_str))
                .unwrap_or(false)
        })
    }

    fn header_status(&self, lines: &[&str], pos: usize) -> HeaderStatus {
        let header = &self.settings.header;
        if pos >= lines.len() {
            return HeaderStatus::Missing;
        }
        let window = &lines[pos..];
        if window.len() >= header.len()
            && window
                .iter()
                .zip(header)
                .all(|(line, want)| line.trim_end() == want)
        {
            return HeaderStatus::Ok;
        }
        // An unexpected comment at the header position needs a human;
        // plain code means the header is simply absent.
        if window[0].trim_start().starts_with("//") {
            HeaderStatus::Mismatch
        } else {
            HeaderStatus::Missing
        }
    }

    fn insert_header(&self, path: &Path, lines: &[&str], pos: usize) -> anyhow::Result<()> {
        let mut out: Vec<String> = Vec::with_capacity(lines.len() + self.settings.header.len() + 1);
        out.extend(lines[..pos].iter().map(|s| (*s).to_string()));
        out.extend(self.settings.header.iter().cloned());
        out.push(String::new());
        out.extend(lines[pos..].iter().map(|s| (*s).to_string()));
        let mut text = out.join("\n");
        text.push('\n');
        std::fs::write(path, text)?;
        Ok(())
    }
}

/// Index of the first line that must carry the header, past any Go
/// build-constraint lines and blank lines.
fn header_position(lines: &[&str]) -> usize {
    let mut idx = 0;
    while idx < lines.len() {
        let line = lines[idx].trim_end();
        if line.starts_with("//go:build") || line.starts_with("// +build") || line.is_empty() {
            idx += 1;
        } else {
            break;
        }
    }
    idx
}

fn is_generated(lines: &[&str]) -> bool {
    lines
        .iter()
        .take(GENERATED_SCAN_LINES)
        .any(|line| line.contains(GENERATED_MARKER))
}

impl LintRule for CopyrightRule {
    fn id(&self) -> &str {
        "copyright-headers"
    }

    fn description(&self) -> &str {
        "Ensures source files carry the expected license header"
    }

    fn help(&self) -> Option<&str> {
        Some(
            "Files must start with the configured license header, after any\n\
             //go:build constraint lines. Generated files are skipped.",
        )
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Code
    }

    fn check(&self, ctx: &LintContext) -> anyhow::Result<RuleResult> {
        let mut violations = Vec::new();
        for rel in &ctx.files {
            if !self.applies_to(rel) {
                continue;
            }
            // Unreadable and non-UTF-8 files are out of scope.
            let Ok(content) = std::fs::read_to_string(ctx.absolute(rel)) else {
                continue;
            };
            let lines: Vec<&str> = content.lines().collect();
            if is_generated(&lines) {
                continue;
            }
            let pos = header_position(&lines);
            match self.header_status(&lines, pos) {
                HeaderStatus::Ok => {}
                HeaderStatus::Missing => {
                    violations.push(
                        RuleViolation::new("HDR-001", "missing copyright header")
                            .with_location(rel.display().to_string())
                            .fixable(),
                    );
                }
                HeaderStatus::Mismatch => {
                    let end = (pos + self.settings.header.len()).min(lines.len());
                    violations.push(
                        RuleViolation::new(
                            "HDR-002",
                            "copyright header does not match the expected header",
                        )
                        .with_location(rel.display().to_string())
                        .with_line(pos + 1)
                        .with_diff(self.settings.header.join("\n"), lines[pos..end].join("\n")),
                    );
                }
            }
        }
        Ok(RuleResult::from_parts(violations, Vec::new()))
    }

    fn can_fix(&self) -> bool {
        true
    }

    fn fix(&self, ctx: &LintContext) -> anyhow::Result<FixResult> {
        let mut fixed = 0;
        let mut details = Vec::new();
        let mut failed = 0;
        for rel in &ctx.files {
            if !self.applies_to(rel) {
                continue;
            }
            let path = ctx.absolute(rel);
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            let lines: Vec<&str> = content.lines().collect();
            if is_generated(&lines) {
                continue;
            }
            let pos = header_position(&lines);
            match self.header_status(&lines, pos) {
                HeaderStatus::Ok => {}
                HeaderStatus::Missing => {
                    self.insert_header(&path, &lines, pos)?;
                    fixed += 1;
                    details.push(FixDetail::Fixed {
                        code: "HDR-001".to_string(),
                        description: format!("inserted header in {}", rel.display()),
                    });
                }
                HeaderStatus::Mismatch => {
                    failed += 1;
                    details.push(FixDetail::FailedToFix {
                        code: "HDR-002".to_string(),
                        reason: format!(
                            "{} has a conflicting header, resolve it manually",
                            rel.display()
                        ),
                    });
                }
            }
        }
        if failed > 0 {
            Ok(FixResult::partial(fixed, failed, details))
        } else {
            let mut result = FixResult::success(fixed);
            result.details = details;
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const HEADER: &str = "// Unless explicitly stated otherwise all files in this repository are licensed\n\
                          // under the Apache License Version 2.0.\n";

    fn context(temp: &TempDir, files: &[&str]) -> LintContext {
        LintContext {
            root: temp.path().to_path_buf(),
            files: files.iter().map(PathBuf::from).collect(),
        }
    }

    fn write_file(temp: &TempDir, rel: &str, content: &str) {
        let path = temp.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_copyright_rule_creation() {
        let rule = CopyrightRule::new(CopyrightSettings::default());
        assert_eq!(rule.id(), "copyright-headers");
        assert_eq!(rule.category(), RuleCategory::Code);
        assert!(rule.can_fix());
    }

    #[test]
    fn test_compliant_file_passes() {
        let temp = TempDir::new().unwrap();
        write_file(&temp, "pkg/util.go", &format!("{HEADER}\npackage util\n"));

        let rule = CopyrightRule::new(CopyrightSettings::default());
        let result = rule.check(&context(&temp, &["pkg/util.go"])).unwrap();
        assert!(result.passed, "violations: {:?}", result.violations);
    }

    #[test]
    fn test_missing_header_flagged_fixable() {
        let temp = TempDir::new().unwrap();
        write_file(&temp, "main.go", "package main\n");

        let rule = CopyrightRule::new(CopyrightSettings::default());
        let result = rule.check(&context(&temp, &["main.go"])).unwrap();
        assert!(!result.passed);
        assert_eq!(result.violations[0].code, "HDR-001");
        assert!(result.violations[0].fixable);
        assert_eq!(result.violations[0].location.as_deref(), Some("main.go"));
    }

    #[test]
    fn test_mismatched_header_flagged() {
        let temp = TempDir::new().unwrap();
        write_file(&temp, "main.go", "// Copyright 2019 Someone Else\npackage main\n");

        let rule = CopyrightRule::new(CopyrightSettings::default());
        let result = rule.check(&context(&temp, &["main.go"])).unwrap();
        assert!(!result.passed);
        assert_eq!(result.violations[0].code, "HDR-002");
        assert!(!result.violations[0].fixable);
        assert_eq!(result.violations[0].line, Some(1));
    }

    #[test]
    fn test_build_constraints_precede_header() {
        let temp = TempDir::new().unwrap();
        let content = format!("//go:build linux\n// +build linux\n\n{HEADER}\npackage linux\n");
        write_file(&temp, "pkg/tagged.go", &content);

        let rule = CopyrightRule::new(CopyrightSettings::default());
        let result = rule.check(&context(&temp, &["pkg/tagged.go"])).unwrap();
        assert!(result.passed, "violations: {:?}", result.violations);
    }

    #[test]
    fn test_generated_file_skipped() {
        let temp = TempDir::new().unwrap();
        write_file(
            &temp,
            "pb/agent.pb.go",
            "// Code generated by protoc-gen-go. DO NOT EDIT.\npackage pb\n",
        );

        let rule = CopyrightRule::new(CopyrightSettings::default());
        let result = rule.check(&context(&temp, &["pb/agent.pb.go"])).unwrap();
        assert!(result.passed);
    }

    #[test]
    fn test_other_extensions_ignored() {
        let temp = TempDir::new().unwrap();
        write_file(&temp, "tasks/lint.py", "import sys\n");

        let rule = CopyrightRule::new(CopyrightSettings::default());
        let result = rule.check(&context(&temp, &["tasks/lint.py"])).unwrap();
        assert!(result.passed);
    }

    #[test]
    fn test_excluded_globs_skipped() {
        let temp = TempDir::new().unwrap();
        write_file(&temp, "vendor/dep/dep.go", "package dep\n");

        let settings = CopyrightSettings {
            exclude: vec!["vendor/**".to_string()],
            ..CopyrightSettings::default()
        };
        let rule = CopyrightRule::new(settings);
        let result = rule.check(&context(&temp, &["vendor/dep/dep.go"])).unwrap();
        assert!(result.passed);
    }

    #[test]
    fn test_fix_inserts_header() {
        let temp = TempDir::new().unwrap();
        write_file(&temp, "main.go", "package main\n");
        let ctx = context(&temp, &["main.go"]);

        let rule = CopyrightRule::new(CopyrightSettings::default());
        let fix = rule.fix(&ctx).unwrap();
        assert!(fix.success);
        assert_eq!(fix.fixed_count, 1);

        let content = std::fs::read_to_string(temp.path().join("main.go")).unwrap();
        assert!(content.starts_with("// Unless explicitly stated"));
        assert!(content.contains("2.0.\n\npackage main\n"));
        assert!(rule.check(&ctx).unwrap().passed);
    }

    #[test]
    fn test_fix_preserves_build_constraints() {
        let temp = TempDir::new().unwrap();
        write_file(
            &temp,
            "pkg/tagged.go",
            "//go:build windows\n\npackage tagged\n",
        );
        let ctx = context(&temp, &["pkg/tagged.go"]);

        let rule = CopyrightRule::new(CopyrightSettings::default());
        rule.fix(&ctx).unwrap();

        let content = std::fs::read_to_string(temp.path().join("pkg/tagged.go")).unwrap();
        assert!(content.starts_with("//go:build windows\n\n// Unless explicitly stated"));
        assert!(rule.check(&ctx).unwrap().passed);
    }

    #[test]
    fn test_fix_is_idempotent() {
        let temp = TempDir::new().unwrap();
        write_file(&temp, "main.go", "package main\n");
        let ctx = context(&temp, &["main.go"]);

        let rule = CopyrightRule::new(CopyrightSettings::default());
        rule.fix(&ctx).unwrap();
        let first = std::fs::read_to_string(temp.path().join("main.go")).unwrap();
        let second_fix = rule.fix(&ctx).unwrap();
        assert_eq!(second_fix.fixed_count, 0);
        let second = std::fs::read_to_string(temp.path().join("main.go")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fix_leaves_mismatched_header_alone() {
        let temp = TempDir::new().unwrap();
        let original = "// Copyright 2019 Someone Else\npackage main\n";
        write_file(&temp, "main.go", original);
        let ctx = context(&temp, &["main.go"]);

        let rule = CopyrightRule::new(CopyrightSettings::default());
        let fix = rule.fix(&ctx).unwrap();
        assert!(!fix.success);
        assert_eq!(fix.failed_count, 1);

        let content = std::fs::read_to_string(temp.path().join("main.go")).unwrap();
        assert_eq!(content, original);
    }

    #[test]
    fn test_fix_records_a_detail_per_file() {
        let temp = TempDir::new().unwrap();
        write_file(&temp, "a.go", "package a\n");
        write_file(&temp, "b.go", "// Copyright 2019 Someone Else\npackage b\n");
        let ctx = context(&temp, &["a.go", "b.go"]);

        let rule = CopyrightRule::new(CopyrightSettings::default());
        let fix = rule.fix(&ctx).unwrap();
        assert_eq!(fix.details.len(), 2);
        assert!(matches!(&fix.details[0], FixDetail::Fixed { code, .. } if code == "HDR-001"));
        assert!(
            matches!(&fix.details[1], FixDetail::FailedToFix { code, .. } if code == "HDR-002")
        );
    }

    #[test]
    fn test_header_position_skips_constraints() {
        let lines = vec!["//go:build linux", "// +build linux", "", "package x"];
        assert_eq!(header_position(&lines), 3);
        assert_eq!(header_position(&["package x"]), 0);
        assert_eq!(header_position(&[]), 0);
    }
}
