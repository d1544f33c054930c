//! The store interface and the change-tracking queries built on it.

use crate::error::StoreError;
use southwind_core::{Row, Table, CHANGE_TOKEN_FIELD, CHANGE_TYPE_FIELD};
use tracing::{debug, info};

/// A relational store that runs arbitrary SQL.
///
/// Implementors provide [`Store::execute`] and [`Store::query`]; the
/// change-tracking helpers are expressed in terms of those two.
pub trait Store {
    /// Run a statement that returns no rows.
    fn execute(&mut self, sql: &str) -> Result<(), StoreError>;

    /// Run a query and collect its rows.
    fn query(&mut self, sql: &str) -> Result<Vec<Row>, StoreError>;

    /// Whether `table` exists.
    fn table_exists(&mut self, table: &str) -> Result<bool, StoreError> {
        let sql = format!(
            "SELECT count(*) AS cnt FROM information_schema.tables WHERE table_name = '{table}'"
        );
        let count = self
            .query(&sql)?
            .first()
            .and_then(|row| row.get("cnt"))
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        Ok(count > 0)
    }

    /// Create `table` with its reserved change-tracking columns.
    fn create_table(&mut self, table: &Table) -> Result<(), StoreError> {
        let sql = table.create_table_sql();
        info!("Creating table: {}", table.name);
        debug!("DDL: {}", sql);
        self.execute(&sql)
    }

    /// Greatest `change_token` in `table`, `None` when the table is empty.
    fn max_change_token(&mut self, table: &str) -> Result<Option<i64>, StoreError> {
        let sql = format!("SELECT max({CHANGE_TOKEN_FIELD}) AS {CHANGE_TOKEN_FIELD} FROM {table}");
        Ok(self
            .query(&sql)?
            .first()
            .and_then(|row| row.get(CHANGE_TOKEN_FIELD))
            .and_then(|v| v.as_i64()))
    }

    /// Every row carrying the greatest `change_token` of `table`.
    fn latest_rows(&mut self, table: &str) -> Result<Vec<Row>, StoreError> {
        let sql = format!(
            "SELECT * FROM {table} WHERE {CHANGE_TOKEN_FIELD} = \
             (SELECT max({CHANGE_TOKEN_FIELD}) FROM {table})"
        );
        self.query(&sql)
    }

    /// Physically remove soft-deleted rows from `table`.
    fn purge_soft_deleted(&mut self, table: &str) -> Result<(), StoreError> {
        self.execute(&format!(
            "DELETE FROM {table} WHERE {CHANGE_TYPE_FIELD} = 'D'"
        ))
    }

    /// Number of rows in `table`, optionally only the live ones.
    fn count_rows(&mut self, table: &str, live_only: bool) -> Result<i64, StoreError> {
        let filter = if live_only {
            format!(" WHERE {CHANGE_TYPE_FIELD} != 'D'")
        } else {
            String::new()
        };
        let sql = format!("SELECT count(*) AS cnt FROM {table}{filter}");
        Ok(self
            .query(&sql)?
            .first()
            .and_then(|row| row.get("cnt"))
            .and_then(|v| v.as_i64())
            .unwrap_or(0))
    }
}

impl<S: Store + ?Sized> Store for &mut S {
    fn execute(&mut self, sql: &str) -> Result<(), StoreError> {
        (**self).execute(sql)
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Row>, StoreError> {
        (**self).query(sql)
    }
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn execute(&mut self, sql: &str) -> Result<(), StoreError> {
        (**self).execute(sql)
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Row>, StoreError> {
        (**self).query(sql)
    }
}
