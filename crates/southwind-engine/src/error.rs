//! Error types for the mutation engine.

use southwind_core::ConfigError;
use southwind_export::ExportError;
use southwind_generator::AssembleError;
use southwind_store::StoreError;
use thiserror::Error;

/// Errors that can occur while running the mutation loop.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Store failure; the current table step is skipped.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Export failure; the current table step is skipped.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Statement assembly hit an invariant violation.
    #[error("Assembly error: {0}")]
    Assemble(#[from] AssembleError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Whether the loop must stop rather than skip the table.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Assemble(_) | EngineError::Config(_))
    }
}
