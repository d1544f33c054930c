//! Statement fragments.
//!
//! A mutating statement is assembled as an ordered list of fragments.
//! Direct fragments are final text; deferred fragments are sub-queries whose
//! scalar result is substituted as a SQL literal before the statement runs.
//! Resolved values always arrive as complete literals (`'text'` or `NULL`),
//! so the surrounding SQL never adds quotes of its own.

use crate::resolve::{quote_literal, Resolved, SubQuery};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Literal text, inserted verbatim
    Direct(String),
    /// Sub-query resolved against the store before the final statement runs
    Deferred(SubQuery),
}

impl From<Resolved> for Fragment {
    fn from(resolved: Resolved) -> Self {
        match resolved {
            Resolved::Direct(text) => Fragment::Direct(quote_literal(Some(&text))),
            Resolved::Lookup(query) | Resolved::Increment(query) => Fragment::Deferred(query),
        }
    }
}

/// An ordered fragment sequence for one mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statement {
    fragments: Vec<Fragment>,
}

impl Statement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append literal text.
    pub fn push_text(&mut self, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        // Merge adjacent text to keep sequences short
        if let Some(Fragment::Direct(last)) = self.fragments.last_mut() {
            last.push_str(&text);
        } else {
            self.fragments.push(Fragment::Direct(text));
        }
        self
    }

    /// Append a fragment produced by imposter resolution.
    pub fn push_resolved(&mut self, resolved: Resolved) -> &mut Self {
        match Fragment::from(resolved) {
            Fragment::Direct(text) => self.push_text(text),
            deferred => {
                self.fragments.push(deferred);
                self
            }
        }
    }

    /// Append a sub-query fragment.
    pub fn push_deferred(&mut self, query: SubQuery) -> &mut Self {
        self.fragments.push(Fragment::Deferred(query));
        self
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Number of sub-queries that must run before the statement itself.
    pub fn deferred_count(&self) -> usize {
        self.fragments
            .iter()
            .filter(|f| matches!(f, Fragment::Deferred(_)))
            .count()
    }
}

/// Shows deferred fragments as `{{sub-query}}`, for logs.
impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fragment in &self.fragments {
            match fragment {
                Fragment::Direct(text) => f.write_str(text)?,
                Fragment::Deferred(query) => write!(f, "{{{{{}}}}}", query.sql)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacent_text_is_merged() {
        let mut statement = Statement::new();
        statement
            .push_text("UPDATE t SET a = ")
            .push_resolved(Resolved::Direct("x".to_string()));
        assert_eq!(
            statement.fragments(),
            &[Fragment::Direct("UPDATE t SET a = 'x'".to_string())]
        );
        assert_eq!(statement.deferred_count(), 0);
    }

    #[test]
    fn test_direct_values_are_escaped() {
        let mut statement = Statement::new();
        statement.push_resolved(Resolved::Direct("O'Brien".to_string()));
        assert_eq!(statement.to_string(), "'O''Brien'");
    }

    #[test]
    fn test_deferred_fragment_kept_separate() {
        let query = SubQuery {
            sql: "SELECT 1 AS inc".to_string(),
            column: "inc".to_string(),
        };
        let mut statement = Statement::new();
        statement
            .push_text("a")
            .push_resolved(Resolved::Increment(query.clone()))
            .push_text("b");
        assert_eq!(statement.fragments().len(), 3);
        assert_eq!(statement.fragments()[1], Fragment::Deferred(query));
        assert_eq!(statement.deferred_count(), 1);
        assert_eq!(statement.to_string(), "a{{SELECT 1 AS inc}}b");
    }
}
