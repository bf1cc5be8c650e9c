//! # Field Descriptors
//!
//! Metadata for one mapped record attribute: column name, column type,
//! primary key flag and write-time default.

use std::fmt;

use super::value::Value;

/// Column type tag, rendered into DDL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    BigInt,
    Varchar(u16),
    Boolean,
    Real,
    Text,
    /// Verbatim DDL type, e.g. `varchar(50)` or `mediumtext`
    Custom(&'static str),
}

impl ColumnType {
    pub fn ddl(&self) -> String {
        match self {
            ColumnType::BigInt => "bigint".to_string(),
            ColumnType::Varchar(n) => format!("varchar({})", n),
            ColumnType::Boolean => "boolean".to_string(),
            ColumnType::Real => "real".to_string(),
            ColumnType::Text => "text".to_string(),
            ColumnType::Custom(ddl) => ddl.to_string(),
        }
    }

    /// Boolean and text columns cannot carry a primary key
    pub fn can_be_primary_key(&self) -> bool {
        !matches!(self, ColumnType::Boolean | ColumnType::Text)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ddl())
    }
}

/// Value used when an attribute is unset at insert time
#[derive(Debug, Clone)]
pub enum FieldDefault {
    Static(Value),
    /// Evaluated on every insert that needs it
    Generator(fn() -> Value),
}

impl FieldDefault {
    pub fn resolve(&self) -> Value {
        match self {
            FieldDefault::Static(value) => value.clone(),
            FieldDefault::Generator(generate) => generate(),
        }
    }
}

/// Description of one mapped attribute
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    column: Option<&'static str>,
    column_type: ColumnType,
    primary_key: bool,
    default: Option<FieldDefault>,
}

impl FieldDescriptor {
    pub fn new(column_type: ColumnType) -> Self {
        Self {
            column: None,
            column_type,
            primary_key: false,
            default: None,
        }
    }

    /// `bigint`, defaults to 0
    pub fn integer() -> Self {
        Self::new(ColumnType::BigInt).with_default(Value::Integer(0))
    }

    /// `varchar(100)`, no default
    pub fn string() -> Self {
        Self::new(ColumnType::Varchar(100))
    }

    pub fn boolean() -> Self {
        Self::new(ColumnType::Boolean)
    }

    /// `real`, defaults to 0.0
    pub fn float() -> Self {
        Self::new(ColumnType::Real).with_default(Value::Float(0.0))
    }

    pub fn text() -> Self {
        Self::new(ColumnType::Text)
    }

    /// Store under a column name different from the attribute name
    pub fn column(mut self, name: &'static str) -> Self {
        self.column = Some(name);
        self
    }

    /// Replace the column type with verbatim DDL
    pub fn ddl(mut self, ddl: &'static str) -> Self {
        self.column_type = ColumnType::Custom(ddl);
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(FieldDefault::Static(value.into()));
        self
    }

    pub fn with_generator(mut self, generate: fn() -> Value) -> Self {
        self.default = Some(FieldDefault::Generator(generate));
        self
    }

    /// Explicit column name, if one was declared
    pub fn column_name(&self) -> Option<&'static str> {
        self.column
    }

    pub fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn field_default(&self) -> Option<&FieldDefault> {
        self.default.as_ref()
    }

    /// Resolve the default, `Null` when none was declared
    pub fn default_value(&self) -> Value {
        self.default
            .as_ref()
            .map(FieldDefault::resolve)
            .unwrap_or(Value::Null)
    }
}
