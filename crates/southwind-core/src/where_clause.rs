//! Parsing of `table.field OP value` conditions.

use crate::error::ConfigError;
use crate::imposter::Imposter;
use std::fmt;

/// Comparison operator of a where condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl Operator {
    /// Operators in the order they are searched for.
    ///
    /// Compound operators come before the single-character operators they
    /// start with, so `a >= 1` never tokenizes as `a > (= 1)`.
    pub const SEARCH_ORDER: [Operator; 6] = [
        Operator::Ge,
        Operator::Le,
        Operator::Ne,
        Operator::Eq,
        Operator::Gt,
        Operator::Lt,
    ];

    /// Token as written in the config.
    pub fn token(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
        }
    }

    /// Token as written in SQL.
    pub fn sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            other => other.token(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A parsed where condition.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    /// Original condition text, kept for error messages and logs
    pub raw: String,
    pub table: String,
    pub field: String,
    pub operator: Operator,
    pub value: Imposter,
}

impl WhereClause {
    /// Parse `<table>.<field> <op> <value>`.
    pub fn parse(clause: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidWhereClause {
            clause: clause.to_string(),
            reason: reason.to_string(),
        };

        let (operator, lhs, rhs) = Operator::SEARCH_ORDER
            .iter()
            .find_map(|op| {
                clause
                    .split_once(op.token())
                    .map(|(lhs, rhs)| (*op, lhs, rhs))
            })
            .ok_or_else(|| invalid("no comparison operator (==, !=, >, <, >=, <=)"))?;

        let (table, field) = lhs
            .trim()
            .split_once('.')
            .ok_or_else(|| invalid("left side must be `table.field`"))?;
        let (table, field) = (table.trim(), field.trim());
        if table.is_empty() || field.is_empty() {
            return Err(invalid("left side must be `table.field`"));
        }

        let value = rhs.trim();
        if value.is_empty() {
            return Err(invalid("missing value"));
        }

        Ok(Self {
            raw: clause.to_string(),
            table: table.to_string(),
            field: field.to_string(),
            operator,
            value: Imposter::parse(value)?,
        })
    }
}

impl fmt::Display for WhereClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} {} {}",
            self.table, self.field, self.operator, self.value
        )
    }
}
