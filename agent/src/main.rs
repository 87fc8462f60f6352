//! CLI entry point for allocheck.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use allocheck_agent::commands::{self, ReportOptions};
use allocheck_agent::error::exit_code;
use allocheck_agent::settings::Settings;

#[derive(Parser)]
#[command(name = "allocheck")]
#[command(about = "Portfolio allocation check: positions export → markdown report")]
#[command(version)]
struct Cli {
    /// Path to settings TOML (default: ./allocheck.toml if present)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reconcile an export against the policy and write the report
    Report {
        /// Path to the positions CSV export
        #[arg(long)]
        csv: PathBuf,

        /// Path to the target policy JSON
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to the thesis markdown document
        #[arg(long)]
        thesis: Option<PathBuf>,

        /// Where to write the report
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Show normalized positions with bucket and weight
    Positions {
        /// Path to the positions CSV export
        #[arg(long)]
        csv: PathBuf,

        /// Path to the target policy JSON
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a target policy and summarize it
    Check {
        /// Path to the target policy JSON
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let settings = match Settings::discover(cli.settings.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {e}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Report {
            csv,
            config,
            thesis,
            out,
        } => {
            let opts = ReportOptions {
                csv,
                policy: config,
                thesis,
                out,
            };
            commands::run_report(&settings, &opts)
                .map(|path| println!("{}", commands::report_written_line(&path)))
        }
        Command::Positions { csv, config, json } => {
            commands::show_positions(&settings, &csv, config.as_deref(), json)
        }
        Command::Check { config } => commands::check_policy(&settings, config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(exit_code(&e));
    }
}
