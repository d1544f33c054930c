//! Core model for the southwind change-feed simulator.
//!
//! This crate holds everything that is fixed once the config has been
//! loaded:
//!
//! - [`Imposter`] - declarative value sources
//! - [`Field`] - named columns with a storage type and an imposter
//! - [`Action`] - weighted create / remove / set intents
//! - [`WhereClause`] - parsed `table.field OP value` conditions
//! - [`Table`] - fields (reserved change-tracking fields last) and actions
//! - [`SimulationConfig`] / [`Schema`] - YAML loading and the validated table registry
//! - [`Row`] / [`Value`] - rows read back from the store
//!
//! # Architecture
//!
//! ```text
//! southwind-core (this crate)
//!    │
//!    ├─── southwind-generator  (resolves imposters, assembles statements)
//!    ├─── southwind-store      (executes statements, reads change tokens)
//!    ├─── southwind-export     (writes changed rows to files)
//!    └─── southwind-engine     (the mutation loop)
//! ```
//!
//! # Example
//!
//! ```rust
//! use southwind_core::SimulationConfig;
//!
//! let config = SimulationConfig::from_yaml(r#"
//! db_path: ":memory:"
//! output: { format: json, path: output }
//! delete_behaviour: soft
//! inter_action_delay: 0
//! tables:
//!   - name: users
//!     fields:
//!       - { name: id, type: integer, value: increment, is_pk: true }
//!       - { name: name, type: varchar, value: 'pattern("user_{index}")' }
//!     actions:
//!       - { name: signup, action: create, frequency: 1.0 }
//! "#).unwrap();
//!
//! let users = config.schema.get_table("users").unwrap();
//! assert_eq!(users.field_names(), vec!["id", "name", "change_token", "change_type"]);
//! ```

pub mod action;
pub mod config;
pub mod error;
pub mod field;
pub mod imposter;
pub mod table;
pub mod values;
pub mod where_clause;

// Re-exports for convenience
pub use action::Action;
pub use config::{DeletePolicy, OutputConfig, OutputFormat, Schema, SimulationConfig};
pub use error::ConfigError;
pub use field::{ChangeType, Field, CHANGE_TOKEN_FIELD, CHANGE_TYPE_FIELD, RESERVED_FIELDS};
pub use imposter::{DirectValue, Imposter};
pub use table::Table;
pub use values::{Row, Value};
pub use where_clause::{Operator, WhereClause};
