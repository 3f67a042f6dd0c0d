//! Database value types
//!
//! This module defines the values bound as statement parameters and the
//! name-addressable record a driver hands back for every fetched row.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Database value that can hold different types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DatabaseValue {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// 32-bit floating point
    Float(f32),
    /// 64-bit floating point
    Double(f64),
    /// String value
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// Timestamp (Unix timestamp in microseconds)
    Timestamp(i64),
}

impl DatabaseValue {
    /// Get the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DatabaseValue::Bool(v) => Some(*v),
            DatabaseValue::Int(v) => Some(*v != 0),
            DatabaseValue::Long(v) => Some(*v != 0),
            _ => None,
        }
    }

    /// Get the value as an i64, widening smaller integers
    pub fn as_long(&self) -> Option<i64> {
        match self {
            DatabaseValue::Long(v) | DatabaseValue::Timestamp(v) => Some(*v),
            DatabaseValue::Int(v) => Some(i64::from(*v)),
            DatabaseValue::Bool(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    /// Get the value as an f64
    pub fn as_double(&self) -> Option<f64> {
        match self {
            DatabaseValue::Double(v) => Some(*v),
            DatabaseValue::Float(v) => Some(f64::from(*v)),
            DatabaseValue::Int(v) => Some(f64::from(*v)),
            DatabaseValue::Long(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Borrow the text of a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DatabaseValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Borrow the payload of a Bytes value
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            DatabaseValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Interpret a Timestamp value as a UTC datetime
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            DatabaseValue::Timestamp(micros) => DateTime::from_timestamp_micros(*micros),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, DatabaseValue::Null)
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            DatabaseValue::Null => "null",
            DatabaseValue::Bool(_) => "bool",
            DatabaseValue::Int(_) => "int",
            DatabaseValue::Long(_) => "long",
            DatabaseValue::Float(_) => "float",
            DatabaseValue::Double(_) => "double",
            DatabaseValue::String(_) => "string",
            DatabaseValue::Bytes(_) => "bytes",
            DatabaseValue::Timestamp(_) => "timestamp",
        }
    }
}

impl fmt::Display for DatabaseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseValue::Null => f.write_str("NULL"),
            DatabaseValue::Bool(v) => write!(f, "{}", v),
            DatabaseValue::Int(v) => write!(f, "{}", v),
            DatabaseValue::Long(v) => write!(f, "{}", v),
            DatabaseValue::Float(v) => write!(f, "{}", v),
            DatabaseValue::Double(v) => write!(f, "{}", v),
            DatabaseValue::String(s) => f.write_str(s),
            DatabaseValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            DatabaseValue::Timestamp(v) => match self.as_datetime() {
                Some(dt) => write!(f, "{}", dt.to_rfc3339()),
                None => write!(f, "{}", v),
            },
        }
    }
}

impl From<bool> for DatabaseValue {
    fn from(v: bool) -> Self {
        DatabaseValue::Bool(v)
    }
}

impl From<i32> for DatabaseValue {
    fn from(v: i32) -> Self {
        DatabaseValue::Int(v)
    }
}

impl From<i64> for DatabaseValue {
    fn from(v: i64) -> Self {
        DatabaseValue::Long(v)
    }
}

impl From<f32> for DatabaseValue {
    fn from(v: f32) -> Self {
        DatabaseValue::Float(v)
    }
}

impl From<f64> for DatabaseValue {
    fn from(v: f64) -> Self {
        DatabaseValue::Double(v)
    }
}

impl From<String> for DatabaseValue {
    fn from(v: String) -> Self {
        DatabaseValue::String(v)
    }
}

impl From<&str> for DatabaseValue {
    fn from(v: &str) -> Self {
        DatabaseValue::String(v.to_string())
    }
}

impl From<Vec<u8>> for DatabaseValue {
    fn from(v: Vec<u8>) -> Self {
        DatabaseValue::Bytes(v)
    }
}

impl From<DateTime<Utc>> for DatabaseValue {
    fn from(v: DateTime<Utc>) -> Self {
        DatabaseValue::Timestamp(v.timestamp_micros())
    }
}

impl<T: Into<DatabaseValue>> From<Option<T>> for DatabaseValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => DatabaseValue::Null,
        }
    }
}

/// Column name to value mapping used by `insert`, kept in insertion order
pub type Fields = IndexMap<String, DatabaseValue>;

/// One record as returned by a driver in dictionary-row mode
///
/// Values are stored in column order; the column names are shared by every
/// row of the same result set.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseRow {
    columns: Arc<[String]>,
    values: Vec<DatabaseValue>,
}

impl DatabaseRow {
    /// Build a row from its result-set columns and its values
    ///
    /// Missing trailing values are padded with `Null`; extra values are dropped.
    pub fn new(columns: Arc<[String]>, mut values: Vec<DatabaseValue>) -> Self {
        values.resize(columns.len(), DatabaseValue::Null);
        Self { columns, values }
    }

    /// Column names in result order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in result order
    pub fn values(&self) -> &[DatabaseValue] {
        &self.values
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for a row without columns
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a zero-based column position
    pub fn get_index(&self, index: usize) -> Option<&DatabaseValue> {
        self.values.get(index)
    }

    /// Value of the first column with this name
    pub fn get(&self, name: &str) -> Option<&DatabaseValue> {
        self.position(name).map(|i| &self.values[i])
    }

    /// True if a column with this name exists
    pub fn contains_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Arc<[String]> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_value_accessors() {
        let val = DatabaseValue::Int(42);
        assert_eq!(val.as_long(), Some(42));
        assert_eq!(val.as_double(), Some(42.0));
        assert_eq!(val.as_str(), None);

        let val = DatabaseValue::from("hello");
        assert_eq!(val.as_str(), Some("hello"));
        assert_eq!(val.to_string(), "hello");

        assert_eq!(DatabaseValue::Long(0).as_bool(), Some(false));
        assert!(DatabaseValue::from(Option::<i32>::None).is_null());
    }

    #[test]
    fn test_timestamp_roundtrip_through_chrono() {
        let now = DateTime::from_timestamp_micros(1_700_000_000_123_456).expect("valid micros");
        let val = DatabaseValue::from(now);
        assert_eq!(val.type_name(), "timestamp");
        assert_eq!(val.as_datetime(), Some(now));
    }

    #[test]
    fn test_row_lookup() {
        let row = DatabaseRow::new(
            columns(&["id", "name"]),
            vec![DatabaseValue::Long(7), "Al".into()],
        );
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("name"), Some(&DatabaseValue::from("Al")));
        assert_eq!(row.get_index(0), Some(&DatabaseValue::Long(7)));
        assert!(row.get("missing").is_none());
        assert!(row.contains_column("id"));
    }

    #[test]
    fn test_row_pads_missing_values() {
        let row = DatabaseRow::new(columns(&["a", "b"]), vec![DatabaseValue::Long(1)]);
        assert_eq!(row.values(), &[DatabaseValue::Long(1), DatabaseValue::Null]);
    }
}
