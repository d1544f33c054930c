//! Row and value representations shared by the store and the exporters.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// A single value read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get this value as an i64.
    ///
    /// Text holding an integer is accepted, since some stores return
    /// aggregates of text columns as text.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Renders the value the way it is substituted into SQL text; NULL renders empty.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// A row with named columns, in result order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

/// Serializes as a map, keeping column order.
impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::new(
            vec!["id".into(), "name".into(), "change_type".into()],
            vec![Value::Int(1), Value::Text("bob".into()), Value::Text("I".into())],
        )
    }

    #[test]
    fn test_get() {
        let row = row();
        assert_eq!(row.get("id"), Some(&Value::Int(1)));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_as_i64() {
        assert_eq!(Value::Int(7).as_i64(), Some(7));
        assert_eq!(Value::Text("12".into()).as_i64(), Some(12));
        assert_eq!(Value::Null.as_i64(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::Text("x".into()).to_string(), "x");
    }

    #[test]
    fn test_serialize_keeps_column_order() {
        let json = serde_json::to_string(&row()).unwrap();
        assert_eq!(json, r#"{"id":1,"name":"bob","change_type":"I"}"#);
    }
}
