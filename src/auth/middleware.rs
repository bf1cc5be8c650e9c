//! # Session Middleware
//!
//! Resolves the session cookie on every request and attaches the signed-in
//! user as a request extension. Paths under `/manage/` require an admin.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use super::cookie::cookie_to_user;
use crate::api::{ApiError, ApiResult};
use crate::blog::User;
use crate::http_server::AppState;
use crate::web::request::cookie_value;
use crate::web::{Reply, RequestContext};

/// Prefix of pages reserved to admins
pub const MANAGE_PREFIX: &str = "/manage/";

/// Where anonymous visitors of admin pages are sent
pub const SIGNIN_PATH: &str = "/signin";

/// Signed-in user of the current request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = match cookie_value(request.headers(), &state.session.cookie_name) {
        Some(cookie) => cookie_to_user(&state.db, &cookie, &state.session.secret).await,
        None => None,
    };

    let is_admin = user.as_ref().map(User::is_admin).unwrap_or(false);
    if let Some(user) = user {
        debug!(email = user.email.as_deref().unwrap_or_default(), "set current user");
        request.extensions_mut().insert(CurrentUser(user));
    }

    if request.uri().path().starts_with(MANAGE_PREFIX) && !is_admin {
        return Reply::redirect(SIGNIN_PATH).into_response();
    }
    next.run(request).await
}

/// User attached by the session middleware
pub fn current_user(request: Option<&RequestContext>) -> Option<&User> {
    request
        .and_then(|r| r.extension::<CurrentUser>())
        .map(|CurrentUser(user)| user)
}

/// The signed-in admin, or a permission error
pub fn require_admin(request: Option<&RequestContext>) -> ApiResult<&User> {
    match current_user(request) {
        Some(user) if user.is_admin() => Ok(user),
        _ => Err(ApiError::permission("")),
    }
}

/// The signed-in user, or a permission error
pub fn require_user(request: Option<&RequestContext>) -> ApiResult<&User> {
    current_user(request).ok_or_else(|| ApiError::permission("Please signin first."))
}
