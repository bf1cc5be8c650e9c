//! Handler results and their conversion to HTTP responses.

use axum::body::Bytes;
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use super::handler::HandlerError;

/// Prefix of a text reply that asks for a redirect
pub const REDIRECT_PREFIX: &str = "redirect:";

const HTML_UTF8: &str = "text/html;charset=utf-8";
const JSON_UTF8: &str = "application/json;charset=utf-8";
const OCTET_STREAM: &str = "application/octet-stream";

/// What a handler may return
pub enum Reply {
    /// Serialized as a JSON body
    Json(serde_json::Value),
    /// Sent as `application/octet-stream`
    Bytes(Bytes),
    /// Sent as HTML, or a 302 when prefixed with `redirect:`
    Text(String),
    /// Bare status code
    Status(u16),
    /// Status code with a reason text body
    StatusText(u16, String),
    /// Already built response, passed through
    Response(Response),
}

impl Reply {
    /// Serialize `value` into a JSON reply
    pub fn json<T: Serialize>(value: &T) -> Result<Self, HandlerError> {
        Ok(Reply::Json(serde_json::to_value(value)?))
    }

    pub fn redirect(location: impl AsRef<str>) -> Self {
        Reply::Text(format!("{}{}", REDIRECT_PREFIX, location.as_ref()))
    }
}

impl std::fmt::Debug for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reply::Json(v) => f.debug_tuple("Json").field(v).finish(),
            Reply::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Reply::Text(t) => f.debug_tuple("Text").field(t).finish(),
            Reply::Status(s) => f.debug_tuple("Status").field(s).finish(),
            Reply::StatusText(s, t) => f.debug_tuple("StatusText").field(s).field(t).finish(),
            Reply::Response(r) => f.debug_tuple("Response").field(&r.status()).finish(),
        }
    }
}

impl From<serde_json::Value> for Reply {
    fn from(value: serde_json::Value) -> Self {
        Reply::Json(value)
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

impl From<Bytes> for Reply {
    fn from(bytes: Bytes) -> Self {
        Reply::Bytes(bytes)
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Reply::Response(response)
    }
}

fn plain(text: String) -> Response {
    ([(CONTENT_TYPE, "text/plain;charset=utf-8")], text).into_response()
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Json(value) => {
                let body = value.to_string();
                ([(CONTENT_TYPE, JSON_UTF8)], body).into_response()
            }
            Reply::Bytes(bytes) => ([(CONTENT_TYPE, OCTET_STREAM)], bytes).into_response(),
            Reply::Text(text) => match text.strip_prefix(REDIRECT_PREFIX) {
                Some(location) => {
                    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
                }
                None => ([(CONTENT_TYPE, HTML_UTF8)], text).into_response(),
            },
            Reply::Status(code) => match StatusCode::from_u16(code) {
                Ok(status) if (100..600).contains(&code) => status.into_response(),
                _ => plain(code.to_string()),
            },
            Reply::StatusText(code, reason) => match StatusCode::from_u16(code) {
                Ok(status) if (100..600).contains(&code) => (status, reason).into_response(),
                _ => plain(format!("({}, {})", code, reason)),
            },
            Reply::Response(response) => response,
        }
    }
}
