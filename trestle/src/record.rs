//! Dynamic grid rows.

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::value::Value;

/// A single data row.
///
/// Records hold field values as a `HashMap<String, Value>` keyed by column
/// path, allowing dynamic access to any field. The `id` is the row identity
/// used by the selection map and the selection-change callback.
///
/// # Example
///
/// ```
/// use trestle::record::Record;
///
/// let row = Record::new("r-1")
///     .set("name", "Contoso")
///     .set("age", 30i64);
///
/// assert_eq!(row.get("age").to_string(), "30");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Stable row identity.
    pub(crate) id: String,
    /// Field values keyed by column path.
    pub(crate) fields: HashMap<String, Value>,
}

impl Record {
    /// Creates an empty record with the given identity.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: HashMap::new(),
        }
    }

    /// Returns the row identity.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sets a field value, consuming and returning the record.
    pub fn set(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(path.into(), value.into());
        self
    }

    /// Inserts a field value in place.
    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(path.into(), value.into());
    }

    /// Returns the value at `path`, or [`Value::Null`] when absent.
    pub fn get(&self, path: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.fields.get(path).unwrap_or(&NULL)
    }

    /// Returns `true` when the field exists and is non-null.
    pub fn has(&self, path: &str) -> bool {
        !self.get(path).is_null()
    }

    /// Iterates over `(path, value)` pairs.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_reads_as_null() {
        let row = Record::new("r-1").set("name", "Contoso");
        assert!(row.get("missing").is_null());
        assert!(!row.has("missing"));
        assert!(row.has("name"));
    }

    #[test]
    fn explicit_null_is_not_present() {
        let row = Record::new("r-1").set("name", Value::Null);
        assert!(!row.has("name"));
    }
}
