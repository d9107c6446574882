//! Recensio — periodic research digest generator.
//! Entry point for the `recensio` binary.

mod config;
mod pipeline;

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use recensio_tracker::PaperTracker;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::pipeline::RunOutcome;

const EXIT_NOTHING_TO_DO: u8 = 2;

#[derive(Parser)]
#[command(name = "recensio", version, about = "Generate a research digest from ACM domain feeds")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch, analyze, and render a new digest.
    Run(RunArgs),
    /// Show history ledger statistics.
    Stats,
    /// Clear the history ledger so every paper counts as new again.
    ResetHistory {
        /// Confirm the destructive reset.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Cap on papers in the digest.
    #[arg(long)]
    pub max_papers: Option<usize>,
    /// Cap on accepted papers per domain feed.
    #[arg(long)]
    pub max_per_feed: Option<usize>,
    /// Include papers from this year onward.
    #[arg(long)]
    pub start_year: Option<i32>,
    /// Month-granular start (1-12); switches the filter to month mode.
    #[arg(long)]
    pub start_month: Option<u32>,
    /// Last year to include.
    #[arg(long)]
    pub end_year: Option<i32>,
    /// Last month to include (1-12); requires --end-year.
    #[arg(long)]
    pub end_month: Option<u32>,
    /// Quick trial run capped at three papers.
    #[arg(long)]
    pub sample: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("recensio=info,warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = match config::Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("could not load recensio.toml: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Run(args) => match pipeline::run(&config, &args).await {
            Ok(RunOutcome::Completed { pdf }) => {
                println!("Digest written to {}", pdf.display());
                ExitCode::SUCCESS
            }
            Ok(RunOutcome::NothingToDo) => ExitCode::from(EXIT_NOTHING_TO_DO),
            Err(e) => {
                error!("digest run failed: {e:#}");
                ExitCode::FAILURE
            }
        },
        Command::Stats => {
            let tracker = PaperTracker::new(&config.paths.history);
            let stats = tracker.stats();
            println!("Processed papers: {}", stats.total_processed);
            for (year, n) in &stats.by_year {
                println!("  {year}: {n}");
            }
            ExitCode::SUCCESS
        }
        Command::ResetHistory { yes } => {
            if !yes {
                error!("refusing to clear the history ledger without --yes");
                return ExitCode::FAILURE;
            }
            let tracker = PaperTracker::new(&config.paths.history);
            match tracker.reset() {
                Ok(()) => {
                    info!("history ledger cleared");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!("reset failed: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
