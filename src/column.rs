//! Column values exchanged with a store
//!
//! These are the shapes a driver hands to the registry on read and receives
//! from it on write. Nothing here knows about JSON typing; that lives in the
//! adapters.

use bytes::Bytes;
use std::fmt;

/// Raw value of a single column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// SQL `NULL` (or an absent column)
    Null,
    /// JSON payload stored as text
    Text(String),
    /// JSON payload stored as UTF-8 bytes
    Blob(Bytes),
    /// Document already parsed by a driver with a native JSON type
    Json(serde_json::Value),
}

impl ColumnValue {
    /// Whether this is SQL `NULL`
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text payload, if stored as text
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Native document, if stored as one
    #[must_use]
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Short label used in logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Json(_) => "json",
        }
    }
}

impl From<String> for ColumnValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ColumnValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<serde_json::Value> for ColumnValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl<T: Into<ColumnValue>> From<Option<T>> for ColumnValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Storage type a driver should use for an outgoing parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeHint {
    /// Native JSON document type (PostgreSQL `jsonb`)
    NativeJson,
    /// Plain string type (`TEXT`, `NVARCHAR`)
    Text,
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NativeJson => "native-json",
            Self::Text => "text",
        })
    }
}

/// Named outgoing value bound to a statement
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Column the value is bound to
    pub name: String,
    /// Value to store
    pub value: ColumnValue,
    /// Storage hint, `None` when the dialect is not recognized
    pub hint: Option<TypeHint>,
}

impl Parameter {
    /// Parameter with no hint
    pub fn new(name: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            hint: None,
        }
    }

    /// Attach a storage hint
    #[must_use]
    pub fn with_hint(mut self, hint: Option<TypeHint>) -> Self {
        self.hint = hint;
        self
    }
}

/// Row materialized by a driver
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Primary key assigned by the driver
    pub id: i64,
    columns: Vec<(String, ColumnValue)>,
}

impl Row {
    pub fn new(id: i64, columns: Vec<(String, ColumnValue)>) -> Self {
        Self { id, columns }
    }

    /// Column by name; missing columns read as `None`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ColumnValue> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    /// Insert or replace a column
    pub fn set(&mut self, name: &str, value: ColumnValue) {
        match self.columns.iter_mut().find(|(column, _)| column == name) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((name.to_string(), value)),
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnValue)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_converts_to_null() {
        assert_eq!(ColumnValue::from(None::<String>), ColumnValue::Null);
        assert_eq!(
            ColumnValue::from(Some("x")),
            ColumnValue::Text("x".to_string())
        );
    }

    #[test]
    fn row_set_replaces_existing_column() {
        let mut row = Row::new(1, vec![("response".to_string(), ColumnValue::Null)]);
        row.set("response", ColumnValue::from("{}"));
        row.set("parameters", ColumnValue::Null);

        assert_eq!(row.get("response").and_then(ColumnValue::as_text), Some("{}"));
        assert_eq!(row.columns().count(), 2);
        assert!(row.get("missing").is_none());
    }
}
