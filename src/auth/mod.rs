//! # Auth Module
//!
//! Password hashing, signed session cookies and the session middleware.

pub mod cookie;
pub mod crypto;
pub mod errors;
pub mod middleware;

pub use cookie::{cookie_to_user, user_to_cookie, SessionCookie};
pub use errors::{AuthError, AuthResult};
pub use middleware::{current_user, require_admin, require_user, session_middleware, CurrentUser};
