//! Column values and result rows.

use serde::{Deserialize, Serialize};

use super::errors::{OrmError, OrmResult};

/// A single SQL parameter or column value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            Value::Bool(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// SQLite has no boolean storage class, so integers decode as booleans too.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            Value::Integer(v) => Some(*v != 0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Name of the variant, used in type mismatch errors
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Integer(i) => serde_json::Value::from(i),
            Value::Float(f) => serde_json::Value::from(f),
            Value::Text(s) => serde_json::Value::String(s),
        }
    }
}

/// Conversion from a column value into a typed record attribute.
pub trait FromValue: Sized {
    const EXPECTED: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    const EXPECTED: &'static str = "text";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "float";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

/// Decode a value for `field`; `Null` decodes to `None` (unset).
pub fn decode<T: FromValue>(field: &str, value: Value) -> OrmResult<Option<T>> {
    if value.is_null() {
        return Ok(None);
    }
    T::from_value(&value)
        .map(Some)
        .ok_or_else(|| OrmError::TypeMismatch {
            field: field.to_string(),
            expected: T::EXPECTED,
            actual: value.kind().to_string(),
        })
}

/// One result row: column name to value, in select order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    /// Value of the named column
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_decodes_as_bool() {
        assert_eq!(decode::<bool>("admin", Value::Integer(1)).unwrap(), Some(true));
        assert_eq!(decode::<bool>("admin", Value::Integer(0)).unwrap(), Some(false));
    }

    #[test]
    fn test_null_decodes_as_unset() {
        assert_eq!(decode::<String>("name", Value::Null).unwrap(), None);
    }

    #[test]
    fn test_type_mismatch() {
        let err = decode::<i64>("age", Value::Text("x".to_string())).unwrap_err();
        assert!(matches!(err, OrmError::TypeMismatch { expected: "integer", .. }));
    }

    #[test]
    fn test_row_preserves_order() {
        let row = Row::new(vec![
            ("id".to_string(), Value::from("1")),
            ("name".to_string(), Value::from("a")),
        ]);
        let names: Vec<_> = row.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["id", "name"]);
        assert_eq!(row.get("name"), Some(&Value::from("a")));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_value_serializes_untagged() {
        let json = serde_json::to_string(&Value::from(3)).unwrap();
        assert_eq!(json, "3");
        let json = serde_json::to_string(&Value::Null).unwrap();
        assert_eq!(json, "null");
    }
}
