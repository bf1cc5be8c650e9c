//! # Persistable Records
//!
//! Typed record structs expose their attributes by name through `Record`,
//! which is all the mapper needs to build statements for any record type.

use super::errors::{OrmError, OrmResult};
use super::schema::ModelSchema;
use super::value::{Row, Value};

/// A typed record mapped onto a table.
///
/// An attribute is "unset" while `get_value` returns `None`. Unset attributes
/// are resolved from their field default when the record is saved.
pub trait Record: Default + Send + Sync + Sized + 'static {
    /// Schema shared by every instance of this type
    fn schema() -> &'static ModelSchema;

    /// Current value of `field`, `None` if unset
    fn get_value(&self, field: &str) -> Option<Value>;

    /// Assign `field`; `Value::Null` unsets it
    fn set_value(&mut self, field: &str, value: Value) -> OrmResult<()>;

    /// Value of `field`, or `Null` when unset
    fn value(&self, field: &str) -> Value {
        self.get_value(field).unwrap_or(Value::Null)
    }

    /// Value of `field`, resolving and caching the field default when unset
    fn value_or_default(&mut self, field: &str) -> OrmResult<Value> {
        if let Some(value) = self.get_value(field) {
            return Ok(value);
        }
        let schema = Self::schema();
        let descriptor = schema
            .field(field)
            .ok_or_else(|| unknown_field(schema, field))?;
        let value = descriptor.default_value();
        if !value.is_null() {
            tracing::debug!(model = schema.model(), field, ?value, "using default value");
            self.set_value(field, value.clone())?;
        }
        Ok(value)
    }

    fn primary_key_value(&self) -> Value {
        self.value(Self::schema().primary_key())
    }

    /// Build an instance from a result row. Columns the schema does not map are ignored.
    fn from_row(row: Row) -> OrmResult<Self> {
        let schema = Self::schema();
        let mut record = Self::default();
        for (column, value) in row {
            if let Some(attribute) = schema.attribute_for_column(&column) {
                record.set_value(attribute, value)?;
            }
        }
        Ok(record)
    }
}

/// Error for an attribute the schema does not declare
pub fn unknown_field(schema: &ModelSchema, field: &str) -> OrmError {
    OrmError::UnknownField {
        model: schema.model().to_string(),
        field: field.to_string(),
    }
}
