//! # API Errors
//!
//! Domain errors raised by handlers. They never become transport failures:
//! the binder turns them into a JSON payload with `error`, `data` and
//! `message`, so clients tell failures apart by the `error` code string.

use serde::Serialize;
use thiserror::Error;

pub const VALUE_INVALID: &str = "value:invalid";
pub const RESOURCE_NOT_FOUND: &str = "resource:notfound";
pub const PERMISSION_FORBIDDEN: &str = "permission:forbidden";

/// Result type for domain operations
pub type ApiResult<T> = Result<T, ApiError>;

/// A logical API failure, e.g. an unknown user
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{error}: {message}")]
pub struct ApiError {
    /// Error code, e.g. `value:invalid`
    pub error: String,
    /// Offending field or resource name
    pub data: String,
    /// Human readable explanation
    pub message: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>, data: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            data: data.into(),
            message: message.into(),
        }
    }

    /// Input value is missing or invalid; `field` names the form field
    pub fn value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(VALUE_INVALID, field, message)
    }

    /// `resource` does not exist
    pub fn not_found(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(RESOURCE_NOT_FOUND, resource, message)
    }

    /// Caller is not allowed to perform the operation
    pub fn permission(message: impl Into<String>) -> Self {
        Self::new(PERMISSION_FORBIDDEN, "permission", message)
    }

    /// Payload sent back to the client
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.error,
            "data": self.data,
            "message": self.message,
        })
    }
}
