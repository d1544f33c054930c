//! Southwind Library
//!
//! A synthetic change-feed generator. Tables declared in a YAML file are
//! continuously mutated in a DuckDB store; every mutation that advances a
//! table's change token is exported as a file.
//!
//! # Crates
//!
//! - `southwind_core` - configuration, imposters, tables and actions
//! - `southwind_generator` - weighted action selection and statement assembly
//! - `southwind_store` - the DuckDB store and two-phase execution
//! - `southwind_export` - JSON / JSON Lines / CSV exporters
//! - `southwind_engine` - the mutation loop
//!
//! # CLI Usage
//!
//! ```bash
//! # Run until interrupted
//! southwind run --config config.yaml
//!
//! # Ten cycles against an in-memory store, no delay
//! southwind run --config config.yaml --db-path :memory: --inter-action-delay 0 --max-cycles 10
//!
//! # Check a configuration without running it
//! southwind validate --config config.yaml
//! ```

use anyhow::Context;
use clap::Args;
use southwind_core::SimulationConfig;
use southwind_engine::MutationEngine;
use southwind_export::FileExporter;
use southwind_store::DuckDbStore;
use std::fmt::Write as _;
use std::path::PathBuf;

pub mod config;

/// Options shared by every subcommand.
#[derive(Args, Clone, Debug)]
pub struct ConfigOpts {
    /// Path to the YAML configuration
    #[arg(long, default_value = "config.yaml", env = "SOUTHWIND_CONFIG")]
    pub config: PathBuf,
}

/// Options for `southwind run`.
#[derive(Args, Clone, Debug)]
pub struct RunOpts {
    #[command(flatten)]
    pub config: ConfigOpts,

    /// Pause after each table, e.g. "250ms", "2s" or "0.5" (overrides the config)
    #[arg(long, env = "SOUTHWIND_INTER_ACTION_DELAY")]
    pub inter_action_delay: Option<String>,

    /// Seed for reproducible action choice and generated values
    #[arg(long, env = "SOUTHWIND_SEED")]
    pub seed: Option<u64>,

    /// Store location, ":memory:" for an in-memory store (overrides the config)
    #[arg(long, env = "SOUTHWIND_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Stop after this many cycles instead of running forever
    #[arg(long)]
    pub max_cycles: Option<u64>,
}

/// Load the configuration and apply command-line overrides.
pub fn load_config(opts: &RunOpts) -> anyhow::Result<SimulationConfig> {
    let mut config = SimulationConfig::from_file(&opts.config.config)
        .with_context(|| format!("Failed to load config from {:?}", opts.config.config))?;

    if let Some(delay) = &opts.inter_action_delay {
        config.inter_action_delay = crate::config::parse_duration(delay)
            .with_context(|| format!("Invalid --inter-action-delay '{delay}'"))?
            .as_secs_f64();
    }
    if let Some(seed) = opts.seed {
        config.seed = Some(seed);
    }
    if let Some(db_path) = &opts.db_path {
        config.db_path = db_path.clone();
    }
    Ok(config)
}

/// Run the mutation loop until a fatal error or `max_cycles`.
pub async fn run(opts: RunOpts) -> anyhow::Result<()> {
    let config = load_config(&opts)?;

    tracing::info!(
        "Starting southwind with {} table(s), store {:?}, output {:?} ({}), delete policy {:?}",
        config.schema.tables().len(),
        config.db_path,
        config.output.path,
        config.output.format,
        config.delete_policy
    );

    let store = DuckDbStore::open(&config.db_path)
        .with_context(|| format!("Failed to open store at {:?}", config.db_path))?;
    let exporter = FileExporter::new(&config.output.path);
    let mut engine = MutationEngine::from_config(&config, store, exporter)
        .context("Failed to create mutation engine")?;

    match opts.max_cycles {
        Some(cycles) => engine.run_cycles(cycles).await,
        None => engine.run().await,
    }
    .context("Mutation loop stopped")?;

    tracing::info!(
        "Finished after {} cycle(s), {} file(s) written",
        engine.cycle(),
        engine.exporter().files_written()
    );
    Ok(())
}

/// Load and validate a configuration, returning a summary of its tables.
pub fn validate(opts: &ConfigOpts) -> anyhow::Result<String> {
    let config = SimulationConfig::from_file(&opts.config)
        .with_context(|| format!("Failed to load config from {:?}", opts.config))?;
    Ok(summarize(&config))
}

/// Human-readable overview of a configuration.
pub fn summarize(config: &SimulationConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "store: {}, output: {} ({}), delete policy: {:?}, delay: {}s",
        config.db_path.display(),
        config.output.path.display(),
        config.output.format,
        config.delete_policy,
        config.inter_action_delay
    );
    for table in config.schema.tables() {
        let _ = writeln!(
            out,
            "table {} ({})",
            table.name,
            table.field_names().join(", ")
        );
        for action in &table.actions {
            let _ = writeln!(
                out,
                "  {} {} frequency={}",
                action.kind(),
                action.name(),
                action.frequency()
            );
        }
    }
    out
}
