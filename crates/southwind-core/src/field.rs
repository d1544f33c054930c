//! Column descriptors.

use crate::imposter::Imposter;

/// Engine-managed column holding the change token of the last mutation.
pub const CHANGE_TOKEN_FIELD: &str = "change_token";

/// Engine-managed column holding `I`, `U` or `D`.
pub const CHANGE_TYPE_FIELD: &str = "change_type";

/// Names user fields may not use.
pub const RESERVED_FIELDS: [&str; 2] = [CHANGE_TOKEN_FIELD, CHANGE_TYPE_FIELD];

/// Kind of the most recent mutation of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Insert,
    Update,
    Delete,
}

impl ChangeType {
    pub fn code(&self) -> &'static str {
        match self {
            ChangeType::Insert => "I",
            ChangeType::Update => "U",
            ChangeType::Delete => "D",
        }
    }
}

/// A named column with its value source.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    /// Storage type as written in DDL, e.g. `integer` or `varchar`
    pub storage_type: String,
    pub imposter: Imposter,
    pub is_primary_key: bool,
    pub table: String,
}

impl Field {
    pub fn new(
        name: impl Into<String>,
        storage_type: impl Into<String>,
        imposter: Imposter,
        is_primary_key: bool,
        table: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            storage_type: storage_type.into(),
            imposter,
            is_primary_key,
            table: table.into(),
        }
    }

    /// The two engine-managed fields every table ends with.
    pub fn reserved(table: &str) -> [Field; 2] {
        [
            Field::new(
                CHANGE_TOKEN_FIELD,
                "INTEGER",
                Imposter::Increment,
                false,
                table,
            ),
            Field::new(
                CHANGE_TYPE_FIELD,
                "TEXT",
                Imposter::literal(ChangeType::Insert.code()),
                false,
                table,
            ),
        ]
    }

    pub fn is_reserved(&self) -> bool {
        RESERVED_FIELDS.contains(&self.name.as_str())
    }

    /// Column definition for `CREATE TABLE`.
    pub fn column_ddl(&self) -> String {
        let mut ddl = format!("{} {}", self.name, self.storage_type);
        if self.is_primary_key {
            ddl.push_str(" PRIMARY KEY");
        }
        if self.name == CHANGE_TYPE_FIELD {
            ddl.push_str(" CHECK (change_type IN ('I', 'U', 'D'))");
        }
        ddl
    }
}
