//! Declarative mutation intents.

use crate::imposter::Imposter;
use crate::where_clause::WhereClause;

/// A mutation a table may perform, weighted by `frequency`.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Insert a row built from the table's own field imposters.
    Create { name: String, frequency: f64 },

    /// Soft-delete the live rows matching `condition` (all live rows when absent).
    Remove {
        name: String,
        frequency: f64,
        condition: Option<WhereClause>,
    },

    /// Update `field` to `value` on the live rows matching `condition`.
    Set {
        name: String,
        frequency: f64,
        field: String,
        value: Imposter,
        condition: Option<WhereClause>,
    },
}

impl Action {
    pub fn name(&self) -> &str {
        match self {
            Action::Create { name, .. } | Action::Remove { name, .. } | Action::Set { name, .. } => {
                name
            }
        }
    }

    /// Relative selection weight.
    pub fn frequency(&self) -> f64 {
        match self {
            Action::Create { frequency, .. }
            | Action::Remove { frequency, .. }
            | Action::Set { frequency, .. } => *frequency,
        }
    }

    pub fn condition(&self) -> Option<&WhereClause> {
        match self {
            Action::Create { .. } => None,
            Action::Remove { condition, .. } | Action::Set { condition, .. } => condition.as_ref(),
        }
    }

    /// Short label of the action kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Create { .. } => "create",
            Action::Remove { .. } => "remove",
            Action::Set { .. } => "set",
        }
    }
}
