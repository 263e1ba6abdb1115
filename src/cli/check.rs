//! The `check` command
//!
//! Runs the lint engine against a repository and prints the report.

use std::path::Path;

use colored::Colorize;

use crate::config::RevisarConfig;
use crate::lint::{LintContext, LintEngine, LintReportFormat};
use crate::output::GitlabSection;

pub fn cmd_check(
    repo: &Path,
    rule: Option<String>,
    fix: bool,
    dry_run: bool,
    format: LintReportFormat,
    list_rules: bool,
) -> anyhow::Result<()> {
    let config = RevisarConfig::load_or_default(repo);
    let engine = LintEngine::new(&config);

    if list_rules {
        println!("{}", "Available lint rules:".bright_white().bold());
        println!();
        for (id, description) in engine.available_rules() {
            println!("  {} - {}", id.bright_yellow(), description);
        }
        return Ok(());
    }

    // Progress chatter stays out of the machine-readable formats.
    let text = matches!(format, LintReportFormat::Text);
    if text {
        println!("{}", "🔍 Repository Hygiene Check".bright_cyan().bold());
        println!("{}", "═".repeat(60).dimmed());
        println!();
    }

    let ctx = LintContext::load(repo)?;
    if text {
        println!(
            "{}",
            format!(
                "Scanning {} ({} tracked files)",
                repo.display(),
                ctx.files.len()
            )
            .dimmed()
        );
    }

    let report = if fix || dry_run {
        if text {
            if dry_run {
                println!("{}", "⚠️  DRY RUN - No changes will be made".yellow().bold());
            } else {
                println!("{}", "🔧 Attempting to fix violations...".bright_yellow());
            }
        }
        engine.fix_all(&ctx, dry_run)
    } else if let Some(rule_id) = rule {
        if text {
            println!("Checking rule: {}", rule_id.bright_yellow());
        }
        engine.check_rule(&rule_id, &ctx)
    } else {
        engine.check_all(&ctx)
    };

    if text {
        println!();
        println!("{}", report.format_text());

        let suggestions = report.suggestions();
        if !suggestions.is_empty() {
            let _section = GitlabSection::open("Allow-listed jobs", true);
            for (_rule, suggestion) in &suggestions {
                match &suggestion.location {
                    Some(location) => {
                        println!("=> {}: {}", location.bold(), suggestion.message);
                    }
                    None => println!("=> {}", suggestion.message),
                }
            }
        }

        // Violation details go to stderr, status and warnings to stdout.
        let violations = report.violations();
        if !violations.is_empty() {
            eprintln!(
                "{}",
                "error: The following violations were found:"
                    .bright_red()
                    .bold()
            );
            for (_rule, violation) in &violations {
                match &violation.location {
                    Some(location) => {
                        eprintln!(
                            "- [{}] {}: {}",
                            violation.code,
                            location.bold(),
                            violation.message
                        );
                    }
                    None => eprintln!("- [{}] {}", violation.code, violation.message),
                }
            }
        }

        if report.is_compliant() {
            println!();
            println!("{}", "✅ All checks passed!".bright_green().bold());
        } else {
            eprintln!();
            eprintln!(
                "{}",
                format!(
                    "❌ {} violations, {} failed checks",
                    report.summary.total_violations, report.summary.failed_checks
                )
                .bright_red()
                .bold()
            );
            if report.summary.fixable_violations > 0 && !fix {
                eprintln!(
                    "   {} violations are auto-fixable (run with --fix)",
                    report.summary.fixable_violations
                );
            }
        }
    } else {
        println!("{}", report.format(format));
    }

    if !report.is_compliant() {
        std::process::exit(1);
    }
    Ok(())
}
