//! # Web Errors
//!
//! Route registration errors and request validation errors for the binder.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Result type for routing and binding
pub type WebResult<T> = Result<T, WebError>;

/// Routing and binding errors
#[derive(Debug, Clone, Error)]
pub enum WebError {
    // ==================
    // Registration Errors (fatal)
    // ==================
    /// Handler registered without a method and path
    #[error("method and path not defined for handler {0}")]
    MissingRoute(String),

    /// `request` parameter followed by a positional parameter
    #[error("request parameter must be the last named parameter in handler {0}")]
    RequestNotLast(String),

    /// Same parameter name declared twice
    #[error("duplicate parameter {param} in handler {handler}")]
    DuplicateParam { handler: String, param: String },

    /// `request` used as a keyword parameter name
    #[error("parameter name {param} is reserved in handler {handler}")]
    ReservedParam { handler: String, param: String },

    /// HTTP method the router cannot dispatch
    #[error("unsupported method {0}")]
    UnsupportedMethod(String),

    /// Two handlers for the same method and path
    #[error("duplicate route {method} {path}")]
    DuplicateRoute { method: String, path: String },

    // ==================
    // Request Errors (4xx)
    // ==================
    /// Request does not satisfy the handler's declared parameters
    #[error("{0}")]
    BadRequest(String),

    // ==================
    // Handler Faults (5xx)
    // ==================
    /// Handler failed with a non-domain error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        WebError::BadRequest(msg.into())
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error was raised while registering routes
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            WebError::MissingRoute(_)
                | WebError::RequestNotLast(_)
                | WebError::DuplicateParam { .. }
                | WebError::ReservedParam { .. }
                | WebError::UnsupportedMethod(_)
                | WebError::DuplicateRoute { .. }
        )
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<WebError> for ErrorResponse {
    fn from(err: WebError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}
