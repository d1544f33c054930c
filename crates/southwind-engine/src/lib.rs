//! The southwind mutation engine.
//!
//! Each cycle visits every table in configuration order:
//!
//! ```text
//! select_action ─► assemble ─► execute_statement ─► max(change_token)
//!                                                        │ advanced?
//!                                                        ▼
//!                                              latest_rows ─► Exporter
//!                                                        │ HARD policy
//!                                                        ▼
//!                                         purge change_type = 'D' everywhere
//! ```
//!
//! # Example
//!
//! ```ignore
//! let config = SimulationConfig::from_file("config.yaml")?;
//! let store = DuckDbStore::open(&config.db_path)?;
//! let exporter = FileExporter::new(&config.output.path);
//! let mut engine = MutationEngine::from_config(&config, store, exporter)?;
//! engine.run().await?;
//! ```

pub mod engine;
mod error;
pub mod state;

pub use engine::{EngineSettings, MutationEngine};
pub use error::EngineError;
pub use state::{StepOutcome, TableState};
