//! Error types for store access.

use thiserror::Error;

/// Errors that can occur while talking to the store.
///
/// These are run-time failures: the engine logs them and skips the current
/// table's mutation rather than stopping.
#[derive(Error, Debug)]
pub enum StoreError {
    /// DuckDB connection or query error.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// A deferred sub-query produced no rows.
    #[error("Query returned no rows: {0}")]
    EmptyResult(String),

    /// A deferred sub-query did not produce the expected column.
    #[error("Column '{column}' missing from result of: {sql}")]
    MissingColumn { column: String, sql: String },

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),
}
