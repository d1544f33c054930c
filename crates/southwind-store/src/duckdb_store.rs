//! DuckDB-backed store.

use crate::error::StoreError;
use crate::store::Store;
use chrono::{DateTime, Days, NaiveDate};
use duckdb::types::{TimeUnit, Value as DuckValue};
use duckdb::Connection;
use southwind_core::{Row, Value};
use std::path::Path;
use tracing::{debug, info};

/// Path that selects an in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// A single DuckDB connection.
pub struct DuckDbStore {
    conn: Connection,
}

impl DuckDbStore {
    /// Open the database at `path`, or an in-memory one for `:memory:`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = DuckDbStore::open("southwind.duckdb")?;
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = if path.as_os_str() == IN_MEMORY {
            Connection::open_in_memory()?
        } else {
            info!("Opening DuckDB database at {}", path.display());
            Connection::open(path)?
        };

        // Test connection
        conn.execute_batch("SELECT 1")
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self { conn })
    }

    /// Open a fresh in-memory database.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::open(IN_MEMORY)
    }
}

impl Store for DuckDbStore {
    fn execute(&mut self, sql: &str) -> Result<(), StoreError> {
        debug!("Executing: {}", sql);
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Row>, StoreError> {
        debug!("Querying: {}", sql);
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let columns: Vec<String> = rows
            .as_ref()
            .map(|stmt| stmt.column_names())
            .unwrap_or_default();

        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let values = (0..columns.len())
                .map(|idx| row.get::<_, DuckValue>(idx).map(convert_value))
                .collect::<Result<Vec<_>, _>>()?;
            result.push(Row::new(columns.clone(), values));
        }
        Ok(result)
    }
}

/// Convert a DuckDB value into the store-neutral [`Value`].
fn convert_value(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::Bool(b),
        DuckValue::TinyInt(i) => Value::Int(i.into()),
        DuckValue::SmallInt(i) => Value::Int(i.into()),
        DuckValue::Int(i) => Value::Int(i.into()),
        DuckValue::BigInt(i) => Value::Int(i),
        DuckValue::HugeInt(i) => i64::try_from(i)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(i.to_string())),
        DuckValue::UTinyInt(i) => Value::Int(i.into()),
        DuckValue::USmallInt(i) => Value::Int(i.into()),
        DuckValue::UInt(i) => Value::Int(i.into()),
        DuckValue::UBigInt(i) => i64::try_from(i)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(i.to_string())),
        DuckValue::Float(f) => Value::Float(f.into()),
        DuckValue::Double(f) => Value::Float(f),
        DuckValue::Decimal(d) => Value::Text(d.to_string()),
        DuckValue::Text(s) => Value::Text(s),
        DuckValue::Enum(s) => Value::Text(s),
        DuckValue::Timestamp(unit, raw) => {
            let micros = match unit {
                TimeUnit::Second => raw.saturating_mul(1_000_000),
                TimeUnit::Millisecond => raw.saturating_mul(1_000),
                TimeUnit::Microsecond => raw,
                TimeUnit::Nanosecond => raw / 1_000,
            };
            match DateTime::from_timestamp_micros(micros) {
                Some(dt) => Value::Text(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
                None => Value::Int(raw),
            }
        }
        DuckValue::Date32(days) => {
            let date = NaiveDate::from_ymd_opt(1970, 1, 1).and_then(|epoch| {
                if days >= 0 {
                    epoch.checked_add_days(Days::new(days.unsigned_abs().into()))
                } else {
                    epoch.checked_sub_days(Days::new(days.unsigned_abs().into()))
                }
            });
            match date {
                Some(date) => Value::Text(date.format("%Y-%m-%d").to_string()),
                None => Value::Int(days.into()),
            }
        }
        other => Value::Text(format!("{other:?}")),
    }
}
