//! Per-table change-detection state.

/// Where a table is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    /// Not yet created or inspected
    Bootstrapping,
    /// Created; `last_token` is the newest change token already exported
    Steady { last_token: Option<i64> },
}

impl TableState {
    pub fn last_token(&self) -> Option<i64> {
        match self {
            TableState::Bootstrapping => None,
            TableState::Steady { last_token } => *last_token,
        }
    }
}

/// The result of one table step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// State to record for the table
    pub state: TableState,
    /// Name of the action that ran, if any
    pub action: Option<String>,
    /// Rows handed to the exporter
    pub exported: usize,
}
