//! Headless driver for the ride simulation.
//!
//! Loads a scenario from a content directory, then runs ticks, rates rides or
//! requests status changes and prints what happened.
//! Run with: `cargo run -p park-simtest -- <command>`

mod commands;
mod report;
mod session;

use anyhow::Result;
use clap::Parser;
use commands::{Rate, Run, Status};

/// Headless ride simulation driver
#[derive(Parser)]
#[command(name = "park-simtest")]
#[command(about = "Run park scenarios without a frontend", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Advance a scenario tick by tick
    Run(Run),

    /// Force a full rating pass on every ride
    Rate(Rate),

    /// Query or apply a status change on one ride
    Status(Status),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for PARK_DATA_DIR and RUST_LOG)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(cmd) => cmd.execute(),
        Command::Rate(cmd) => cmd.execute(),
        Command::Status(cmd) => cmd.execute(),
    }
}
