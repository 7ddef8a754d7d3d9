//! Scenecheck CLI - run rule sets against scene files

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{batch, check, configs, rules};
use scenecheck_rules::DEFAULT_CONFIG;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "scenecheck")]
#[command(about = "Check scenes against configurable content rules", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding rule set files (<name>.json)
    #[arg(long, global = true, default_value = "configs", env = "SCENECHECK_CONFIG_DIR")]
    configs: PathBuf,

    /// Rule set to use
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: String,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a scene and optionally fix reported problems
    Check {
        /// Path to scene file
        scene: PathBuf,

        /// Only run rules of this category (repeatable)
        #[arg(long)]
        category: Vec<String>,

        /// Only run the rule with this name (repeatable)
        #[arg(long)]
        only: Vec<String>,

        /// Apply the fix of the reported rule with this name (repeatable)
        #[arg(long)]
        adjust: Vec<String>,

        /// Apply fixes in memory without saving the scene
        #[arg(long)]
        dry_run: bool,

        /// Show diff of changes made by fixes
        #[arg(long)]
        output_diff: bool,

        /// Also write the results as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Check scene files and write one CSV report per scene
    Batch {
        /// Scene files to check
        #[arg(required = true)]
        scenes: Vec<PathBuf>,

        /// Output CSV path (single scene only)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory for CSV reports (defaults to each scene's directory)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// List available rule sets
    Configs {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show the rules of a rule set
    Rules {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check {
            scene,
            category,
            only,
            adjust,
            dry_run,
            output_diff,
            csv,
            format,
        } => check::run(check::CheckArgs {
            scene,
            config_dir: cli.configs,
            config: cli.config,
            categories: category,
            only,
            adjust,
            dry_run,
            output_diff,
            csv,
            format,
        }),
        Commands::Batch {
            scenes,
            output,
            output_dir,
        } => batch::run(batch::BatchArgs {
            scenes,
            config_dir: cli.configs,
            config: cli.config,
            output,
            output_dir,
        }),
        Commands::Configs { format } => configs::run(&cli.configs, &format),
        Commands::Rules { format } => rules::run(&cli.configs, &cli.config, &format),
    }
}

/// Logs go to stderr so stdout stays parseable with `--format json`
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "scenecheck=debug"
    } else {
        "scenecheck=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
