//! Store access for the southwind change-feed simulator.
//!
//! [`Store`] is the seam between the mutation engine and the database. The
//! bundled implementation is [`DuckDbStore`]; statements produced by the
//! generator crate run through [`execute_statement`].

pub mod duckdb_store;
pub mod error;
pub mod execute;
pub mod store;

pub use duckdb_store::DuckDbStore;
pub use error::StoreError;
pub use execute::{execute_statement, fetch_scalar, resolve_statement};
pub use store::Store;
