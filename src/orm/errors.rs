//! # ORM Errors
//!
//! Error types for the data mapper.

use std::fmt;

use thiserror::Error;

/// Result type for mapper operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Which statement produced a write anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    Insert,
    Update,
    Delete,
}

impl WriteOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteOperation::Insert => "insert",
            WriteOperation::Update => "update",
            WriteOperation::Delete => "delete",
        }
    }
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data mapper errors
#[derive(Debug, Error)]
pub enum OrmError {
    // ==================
    // Schema Declaration Errors (fatal)
    // ==================
    /// Record type declares no primary key
    #[error("Primary key not found for model {0}")]
    MissingPrimaryKey(String),

    /// Record type declares more than one primary key
    #[error("Duplicate primary key for field: {field} in model {model}")]
    DuplicatePrimaryKey { model: String, field: String },

    /// The same attribute was declared twice
    #[error("Duplicate field {field} in model {model}")]
    DuplicateField { model: String, field: String },

    /// Column type cannot act as a primary key
    #[error("Field {field} in model {model} cannot be a primary key")]
    InvalidPrimaryKey { model: String, field: String },

    // ==================
    // Query Composition Errors
    // ==================
    /// Limit is neither a count nor an (offset, count) pair
    #[error("Invalid limit value: {0}")]
    InvalidLimit(String),

    // ==================
    // Record Access Errors
    // ==================
    /// Attribute is not mapped on the record type
    #[error("Model {model} has no attribute {field}")]
    UnknownField { model: String, field: String },

    /// Stored value does not fit the attribute's Rust type
    #[error("Field {field} expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: String,
    },

    // ==================
    // Write Outcome
    // ==================
    /// Statement affected a row count other than one
    #[error("failed to {operation} record in {table}: affected rows: {affected}")]
    Write {
        operation: WriteOperation,
        table: String,
        affected: u64,
    },

    // ==================
    // Infrastructure
    // ==================
    /// Column storage class the mapper cannot represent
    #[error("Unsupported column type {type_name} for column {column}")]
    UnsupportedColumn { column: String, type_name: String },

    /// Driver or pool failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl OrmError {
    /// Whether the error stems from a schema declaration mistake
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            OrmError::MissingPrimaryKey(_)
                | OrmError::DuplicatePrimaryKey { .. }
                | OrmError::DuplicateField { .. }
                | OrmError::InvalidPrimaryKey { .. }
                | OrmError::InvalidLimit(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_message() {
        let err = OrmError::Write {
            operation: WriteOperation::Update,
            table: "blogs".to_string(),
            affected: 0,
        };
        assert_eq!(
            err.to_string(),
            "failed to update record in blogs: affected rows: 0"
        );
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_configuration_errors() {
        assert!(OrmError::MissingPrimaryKey("User".to_string()).is_configuration());
        assert!(OrmError::InvalidLimit("(1, 2, 3)".to_string()).is_configuration());
    }
}
