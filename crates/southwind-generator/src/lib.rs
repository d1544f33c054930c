//! Mutation compilation for the southwind change-feed simulator.
//!
//! Turns a table and a chosen action into a [`Statement`]: an ordered list
//! of literal text and deferred sub-queries. The store resolves the
//! sub-queries first and runs the fully literal statement afterwards.
//!
//! ```text
//! Table + Action
//!        │  select_action (weighted by frequency)
//!        ▼
//! ┌─────────────────┐
//! │    assemble     │──── resolve(Imposter) ──► Direct | Lookup | Increment
//! └────────┬────────┘
//!          ▼
//!    Statement [ Direct("INSERT ... ('"), Deferred(max+1), Direct("', ...") ]
//! ```
//!
//! # Example
//!
//! ```rust
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use southwind_core::{Action, Field, Imposter, Table};
//! use southwind_generator::{assemble, select_action};
//!
//! let table = Table::new(
//!     "users",
//!     vec![Field::new("id", "integer", Imposter::Increment, true, "users")],
//!     vec![Action::Create { name: "signup".into(), frequency: 1.0 }],
//! );
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let action = select_action(&table.actions, &mut rng).unwrap();
//! let statement = assemble(&table, action, &mut rng, 0).unwrap();
//! assert_eq!(statement.deferred_count(), 2);
//! ```

pub mod assembler;
pub mod generators;
pub mod resolve;
pub mod selection;
pub mod statement;

// Re-exports for convenience
pub use assembler::{assemble, next_token_query, AssembleError};
pub use resolve::{escape_literal, quote_literal, resolve, ResolveContext, Resolved, SubQuery};
pub use selection::select_action;
pub use statement::{Fragment, Statement};
