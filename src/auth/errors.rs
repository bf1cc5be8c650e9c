//! # Auth Errors
//!
//! Error types for the authentication module.

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    // ==================
    // Cookie Errors
    // ==================
    /// Cookie is not `id-expires-signature`
    #[error("Malformed session cookie")]
    MalformedCookie,

    /// Cookie expiry has passed
    #[error("Session expired")]
    CookieExpired,

    /// Signature does not match the stored credentials
    #[error("Invalid session signature")]
    InvalidSignature,

    /// Cookie names a user that does not exist
    #[error("Unknown session user")]
    UnknownUser,

    // ==================
    // Internal Errors
    // ==================
    /// Password hashing failed
    #[error("Internal error: password hashing failed")]
    HashingFailed,

    /// User lookup failed
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MalformedCookie => 400,
            AuthError::CookieExpired => 401,
            AuthError::InvalidSignature => 401,
            AuthError::UnknownUser => 401,
            AuthError::HashingFailed => 500,
            AuthError::StorageError(_) => 500,
        }
    }

    /// Returns whether this error should be logged at warn level
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
