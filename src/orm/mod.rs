//! # Data Mapper
//!
//! Declarative mapping of typed records onto SQL tables.
//!
//! A record type declares its fields once through `ModelSchema::builder`;
//! the schema validates the primary key and caches the select, insert,
//! update and delete templates. `Database` runs those templates on pooled
//! connections for any type implementing `Record`.

pub mod config;
pub mod errors;
pub mod field;
pub mod mapper;
pub mod pool;
pub mod record;
pub mod schema;
pub mod value;

pub use config::DbConfig;
pub use errors::{OrmError, OrmResult, WriteOperation};
pub use field::{ColumnType, FieldDefault, FieldDescriptor};
pub use mapper::{FindOptions, Limit};
pub use pool::Database;
pub use record::{unknown_field, Record};
pub use schema::{escape_ident, ModelSchema, ModelSchemaBuilder, SqlTemplates};
pub use value::{decode, FromValue, Row, Value};
