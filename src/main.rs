//! Command-line interface for southwind
//!
//! # Usage Examples
//!
//! ```bash
//! # Mutate the configured tables until interrupted
//! southwind run --config config.yaml
//!
//! # A short reproducible smoke run
//! southwind run --config config.yaml --seed 42 --inter-action-delay 0 --max-cycles 100
//!
//! # Validate a configuration and print its tables and actions
//! southwind validate --config config.yaml
//! ```
//!
//! Logging is controlled with `RUST_LOG` (default `info`); `RUST_LOG=debug`
//! shows every executed statement.

use clap::{Parser, Subcommand};
use southwind::{ConfigOpts, RunOpts};

#[derive(Parser)]
#[command(name = "southwind")]
#[command(about = "Generate a synthetic change feed by mutating declared tables")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the mutation loop
    Run(RunOpts),

    /// Load and validate a configuration without running it
    Validate(ConfigOpts),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(opts) => southwind::run(opts).await,
        Commands::Validate(opts) => {
            let summary = southwind::validate(&opts)?;
            print!("{summary}");
            Ok(())
        }
    }
}
