use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use revisar::cli::check::cmd_check;
use revisar::cli::secrets::{cmd_secrets, SecretsFormat};
use revisar::lint::LintReportFormat;

#[derive(Parser)]
#[command(name = "revisar")]
#[command(version, about = "Repository hygiene linter for GitLab-style CI configurations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run lint rules against a repository
    Check {
        /// Repository to lint
        #[arg(default_value = ".")]
        repo: PathBuf,

        /// Specific rule to check (e.g., job-change-paths, filenames)
        #[arg(long)]
        rule: Option<String>,

        /// Attempt to auto-fix violations
        #[arg(long)]
        fix: bool,

        /// Dry run (show what would be fixed)
        #[arg(long)]
        dry_run: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: LintReportFormat,

        /// List available rules
        #[arg(long)]
        list_rules: bool,
    },

    /// List SSM parameters declared in the CI configuration
    Secrets {
        /// Repository to scan
        #[arg(default_value = ".")]
        repo: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: SecretsFormat,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter_layer = if cli.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::new("info")
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Revisar v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Check {
            repo,
            rule,
            fix,
            dry_run,
            format,
            list_rules,
        } => {
            info!("Linting repository at {:?}", repo);
            cmd_check(&repo, rule, fix, dry_run, format, list_rules)?;
        }
        Commands::Secrets { repo, format } => {
            info!("Listing SSM parameters for {:?}", repo);
            cmd_secrets(&repo, format)?;
        }
    }

    Ok(())
}
