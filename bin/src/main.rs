//! vantage CLI binary.
//!
//! Fetches valuation and fundamentals data for one index or equity, writes
//! SVG charts (and optionally CSV tables) and prints a short summary.

mod cmd;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmd::{GapArg, TargetArgs};
use std::process;

#[derive(Parser)]
#[command(name = "vantage")]
#[command(about = "Valuation percentile and fundamentals charts", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (RUST_LOG overrides)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trailing P/E and its historical percentile
    Valuation {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// ROE, net margin, revenue and profit growth, ROA by quarter
    Fundamentals {
        #[command(flatten)]
        target: TargetArgs,

        /// Gap handling after alignment
        #[arg(long, value_enum, default_value_t = GapArg::Missing)]
        gap_policy: GapArg,
    },

    /// Valuation and fundamentals in one go
    Report {
        #[command(flatten)]
        target: TargetArgs,

        /// Gap handling after alignment
        #[arg(long, value_enum, default_value_t = GapArg::Missing)]
        gap_policy: GapArg,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Valuation { target } => {
            let request = target.request()?;
            let provider = cmd::connect(&target).await?;
            cmd::valuation::run(&provider, &request, &target).await
        }
        Commands::Fundamentals { target, gap_policy } => {
            let request = target.request()?;
            let provider = cmd::connect(&target).await?;
            cmd::fundamentals::run(&provider, &request, &target, gap_policy.into()).await
        }
        Commands::Report { target, gap_policy } => {
            let request = target.request()?;
            let provider = cmd::connect(&target).await?;
            cmd::valuation::run(&provider, &request, &target).await?;
            cmd::fundamentals::run(&provider, &request, &target, gap_policy.into()).await
        }
    }
}
