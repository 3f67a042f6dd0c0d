//! Row view: one fetched record readable by position, name or attribute
//!
//! A [`RowView`] is simultaneously an ordered sequence of values, a
//! name-keyed mapping and an attribute accessor. Attribute lookup gives the
//! row's own accessors priority over columns, so a column that happens to be
//! called `items` or `get` is reached as `items_` or `get_`.

use super::error::{DatabaseError, Result};
use super::value::{DatabaseRow, DatabaseValue};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::ops::Index;

/// Names resolved to row accessors before any column lookup
///
/// This is the complete set: the sequence length plus the mapping methods
/// a row offers. Every other name is a column candidate.
pub const ROW_ACCESSORS: &[&str] = &["len", "keys", "values", "items", "get", "copy"];

/// Result of [`RowView::get_by_attribute`]
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute<'a> {
    /// A column value
    Column(&'a DatabaseValue),
    /// `len`: number of columns
    Len(usize),
    /// `keys`: column names in order
    Keys(Vec<&'a str>),
    /// `values`: values in order
    Values(&'a [DatabaseValue]),
    /// `items`: `(name, value)` pairs in order
    Items(Vec<(&'a str, &'a DatabaseValue)>),
    /// A row method that takes arguments (`get`) or none (`copy`); call it
    /// directly as [`RowView::get`] or `clone`
    Method(&'static str),
}

impl<'a> Attribute<'a> {
    /// The column value, if this attribute resolved to a column
    pub fn as_column(&self) -> Option<&'a DatabaseValue> {
        match self {
            Attribute::Column(value) => Some(value),
            _ => None,
        }
    }
}

/// Immutable view over one fetched record
#[derive(Debug, Clone)]
pub struct RowView {
    row: DatabaseRow,
}

impl RowView {
    /// Wrap a driver record
    pub fn new(row: DatabaseRow) -> Self {
        Self { row }
    }

    /// The underlying driver record
    pub fn record(&self) -> &DatabaseRow {
        &self.row
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.row.len()
    }

    /// True for a row without columns
    pub fn is_empty(&self) -> bool {
        self.row.is_empty()
    }

    /// Column names in order
    pub fn keys(&self) -> Vec<&str> {
        self.row.columns().iter().map(String::as_str).collect()
    }

    /// Values in column order
    pub fn values(&self) -> &[DatabaseValue] {
        self.row.values()
    }

    /// `(name, value)` pairs in column order
    pub fn items(&self) -> Vec<(&str, &DatabaseValue)> {
        self.row
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.row.values())
            .collect()
    }

    /// Iterate over the values in column order
    pub fn iter(&self) -> std::slice::Iter<'_, DatabaseValue> {
        self.row.values().iter()
    }

    /// Mapping-style lookup that returns `None` for an unknown column
    pub fn get(&self, name: &str) -> Option<&DatabaseValue> {
        self.row.get(name)
    }

    /// Value at `index`; negative positions count from the end
    pub fn get_by_position(&self, index: isize) -> Result<&DatabaseValue> {
        let len = self.len() as isize;
        let resolved = if index < 0 { len + index } else { index };
        if resolved < 0 || resolved >= len {
            return Err(DatabaseError::index_out_of_range(index));
        }
        Ok(&self.row.values()[resolved as usize])
    }

    /// Value of the column called `name`
    pub fn get_by_name(&self, name: &str) -> Result<&DatabaseValue> {
        self.row
            .get(name)
            .ok_or_else(|| DatabaseError::ColumnNotFound(name.to_string()))
    }

    /// Attribute-style lookup
    ///
    /// Row accessors ([`ROW_ACCESSORS`]) win over columns of the same name. A trailing underscore is stripped when the remaining
    /// name is a column, which is how shadowed columns are reached. Otherwise
    /// the bare name is looked up as a column.
    pub fn get_by_attribute(&self, name: &str) -> Result<Attribute<'_>> {
        match name {
            "len" => return Ok(Attribute::Len(self.len())),
            "keys" => return Ok(Attribute::Keys(self.keys())),
            "values" => return Ok(Attribute::Values(self.values())),
            "items" => return Ok(Attribute::Items(self.items())),
            "get" => return Ok(Attribute::Method("get")),
            "copy" => return Ok(Attribute::Method("copy")),
            _ => {}
        }

        if let Some(stripped) = name.strip_suffix('_') {
            if let Some(value) = self.row.get(stripped) {
                return Ok(Attribute::Column(value));
            }
        }

        self.row
            .get(name)
            .map(Attribute::Column)
            .ok_or_else(|| DatabaseError::AttributeNotFound(name.to_string()))
    }
}

impl From<DatabaseRow> for RowView {
    fn from(row: DatabaseRow) -> Self {
        Self::new(row)
    }
}

impl PartialEq for RowView {
    fn eq(&self, other: &Self) -> bool {
        self.values() == other.values()
    }
}

impl PartialEq<[DatabaseValue]> for RowView {
    fn eq(&self, other: &[DatabaseValue]) -> bool {
        self.values() == other
    }
}

impl PartialEq<Vec<DatabaseValue>> for RowView {
    fn eq(&self, other: &Vec<DatabaseValue>) -> bool {
        self.values() == other.as_slice()
    }
}

impl<const N: usize> PartialEq<[DatabaseValue; N]> for RowView {
    fn eq(&self, other: &[DatabaseValue; N]) -> bool {
        self.values() == other.as_slice()
    }
}

impl Index<usize> for RowView {
    type Output = DatabaseValue;

    fn index(&self, index: usize) -> &DatabaseValue {
        &self.row.values()[index]
    }
}

impl Index<&str> for RowView {
    type Output = DatabaseValue;

    fn index(&self, name: &str) -> &DatabaseValue {
        match self.row.get(name) {
            Some(value) => value,
            None => panic!("no column named '{}'", name),
        }
    }
}

impl<'a> IntoIterator for &'a RowView {
    type Item = &'a DatabaseValue;
    type IntoIter = std::slice::Iter<'a, DatabaseValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for RowView {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.items() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn row(names: &[&str], values: Vec<DatabaseValue>) -> RowView {
        let columns: Arc<[String]> = names.iter().map(|n| n.to_string()).collect();
        RowView::new(DatabaseRow::new(columns, values))
    }

    #[test]
    fn test_positional_access() {
        let r = row(
            &["a", "b", "c"],
            vec![1i64.into(), 2i64.into(), 3i64.into()],
        );
        assert_eq!(r.get_by_position(0).unwrap(), &DatabaseValue::Long(1));
        assert_eq!(r.get_by_position(-1).unwrap(), &DatabaseValue::Long(3));
        assert_eq!(r.get_by_position(-3).unwrap(), &DatabaseValue::Long(1));
        assert!(r.get_by_position(3).unwrap_err().is_index_error());
        assert!(r.get_by_position(-4).unwrap_err().is_index_error());
        assert_eq!(r[1], DatabaseValue::Long(2));
    }

    #[test]
    fn test_name_access() {
        let r = row(&["value"], vec![DatabaseValue::Long(5)]);
        assert_eq!(r.get_by_name("value").unwrap(), &DatabaseValue::Long(5));
        assert_eq!(r["value"], DatabaseValue::Long(5));
        assert!(matches!(
            r.get_by_name("nope"),
            Err(DatabaseError::ColumnNotFound(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_attribute_resolution_order() {
        let r = row(
            &["items", "value", "len_"],
            vec![
                "shadowed".into(),
                DatabaseValue::Long(97),
                DatabaseValue::Long(-1),
            ],
        );

        // accessors win over a column of the same name
        for accessor in ROW_ACCESSORS {
            assert!(r.get_by_attribute(accessor).unwrap().as_column().is_none());
        }
        assert_eq!(r.get_by_attribute("len").unwrap(), Attribute::Len(3));
        assert!(matches!(
            r.get_by_attribute("items").unwrap(),
            Attribute::Items(pairs) if pairs.len() == 3
        ));

        // trailing underscore reaches the shadowed column
        assert_eq!(
            r.get_by_attribute("items_").unwrap().as_column(),
            Some(&DatabaseValue::from("shadowed"))
        );
        assert_eq!(
            r.get_by_attribute("value_").unwrap(),
            Attribute::Column(&DatabaseValue::Long(97))
        );
        assert_eq!(
            r.get_by_attribute("value").unwrap(),
            Attribute::Column(&DatabaseValue::Long(97))
        );

        // no `len` column, so `len_` falls through to the literal column
        assert_eq!(
            r.get_by_attribute("len_").unwrap(),
            Attribute::Column(&DatabaseValue::Long(-1))
        );

        assert!(matches!(
            r.get_by_attribute("missing"),
            Err(DatabaseError::AttributeNotFound(_))
        ));
        assert!(matches!(
            r.get_by_attribute("missing_"),
            Err(DatabaseError::AttributeNotFound(_))
        ));
    }

    #[test]
    fn test_items_accessor() {
        let r = row(&["value"], vec![DatabaseValue::Long(97)]);
        assert_eq!(
            r.get_by_attribute("items").unwrap(),
            Attribute::Items(vec![("value", &DatabaseValue::Long(97))])
        );
        assert_eq!(
            r.get_by_attribute("keys").unwrap(),
            Attribute::Keys(vec!["value"])
        );
    }

    #[test]
    fn test_mapping_methods_shadow_columns() {
        let r = row(&["get", "copy"], vec![DatabaseValue::Long(1), DatabaseValue::Long(2)]);
        assert_eq!(r.get_by_attribute("get").unwrap(), Attribute::Method("get"));
        assert_eq!(r.get_by_attribute("copy").unwrap(), Attribute::Method("copy"));
        assert_eq!(
            r.get_by_attribute("get_").unwrap(),
            Attribute::Column(&DatabaseValue::Long(1))
        );
        assert_eq!(
            r.get_by_attribute("copy_").unwrap(),
            Attribute::Column(&DatabaseValue::Long(2))
        );
        assert_eq!(r.get("get"), Some(&DatabaseValue::Long(1)));
    }

    #[test]
    fn test_sequence_equality() {
        let r = row(&["a", "b"], vec![DatabaseValue::Long(1), "x".into()]);
        assert_eq!(r, vec![DatabaseValue::Long(1), DatabaseValue::from("x")]);
        assert_eq!(r, [DatabaseValue::Long(1), DatabaseValue::from("x")]);
        assert_ne!(r, vec![DatabaseValue::Long(1)]);

        // equality ignores column names
        let other = row(&["c", "d"], vec![DatabaseValue::Long(1), "x".into()]);
        assert_eq!(r, other);

        let collected: Vec<&DatabaseValue> = r.iter().collect();
        assert_eq!(collected.len(), 2);
    }

    #[test]
    fn test_serialize_as_map() {
        let r = row(&["id", "name"], vec![DatabaseValue::Long(1), "Al".into()]);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": { "Long": 1 }, "name": { "String": "Al" } })
        );
    }
}
