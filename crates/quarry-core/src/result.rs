//! Query results as returned by a warehouse

use crate::schema::LogicalType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key/value annotations attached to a query as a trailing SQL comment
pub type Tags = BTreeMap<String, String>;

/// A single cell, in the engine's own value model
///
/// No coercion happens between the wire and this type: text columns arrive
/// as `Bytes`, numeric columns in text protocol results may too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    /// Calendar value: DATE, DATETIME and TIMESTAMP columns
    Date {
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        micro: u32,
    },
    /// Duration value: TIME columns
    Time {
        negative: bool,
        days: u32,
        hours: u8,
        minutes: u8,
        seconds: u8,
        micros: u32,
    },
}

impl Value {
    /// Text shortcut for string-like cells
    pub fn text(s: impl Into<String>) -> Self {
        Self::Bytes(s.into().into_bytes())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the cell as UTF-8 text, if it is a valid UTF-8 byte string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Bytes(bytes) => std::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }
}

/// One result row: column values in result-set order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub values: Vec<(String, Value)>,
}

impl Row {
    pub fn new(values: Vec<(String, Value)>) -> Self {
        Self { values }
    }

    /// Find a value by column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Text value of a column, `None` for NULL, absent or non-text cells
    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Per-column metadata in a query result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    #[serde(rename = "type")]
    pub logical_type: LogicalType,
}

impl FieldInfo {
    pub fn new(logical_type: LogicalType) -> Self {
        Self { logical_type }
    }
}

/// Rows plus a logical type for every result column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Rows in the order the engine returned them
    pub rows: Vec<Row>,

    /// Column name to field metadata
    pub fields: BTreeMap<String, FieldInfo>,
}

impl QueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Logical type of a result column
    pub fn field_type(&self, column: &str) -> Option<LogicalType> {
        self.fields.get(column).map(|f| f.logical_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_lookup() {
        let row: Row = vec![
            ("id".to_string(), Value::Int(7)),
            ("name".to_string(), Value::text("ada")),
            ("deleted_at".to_string(), Value::Null),
        ]
        .into_iter()
        .collect();

        assert_eq!(row.len(), 3);
        assert_eq!(row.get("id"), Some(&Value::Int(7)));
        assert_eq!(row.get_str("name"), Some("ada"));
        assert_eq!(row.get_str("deleted_at"), None);
        assert!(row.get("deleted_at").is_some_and(Value::is_null));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn non_utf8_bytes_are_not_text() {
        assert_eq!(Value::Bytes(vec![0xff, 0xfe]).as_str(), None);
        assert_eq!(Value::Int(1).as_str(), None);
    }

    #[test]
    fn field_info_serializes_as_type() {
        let field = FieldInfo::new(LogicalType::Number);
        assert_eq!(serde_json::to_value(field).unwrap(), serde_json::json!({"type": "number"}));
    }
}
