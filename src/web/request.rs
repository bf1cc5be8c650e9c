//! # Request Context
//!
//! Owned snapshot of an incoming request: method, URI, headers, body and
//! matched path variables. The body is read once so the binder can parse it
//! synchronously and handlers can still inspect the raw request afterwards.

use std::collections::HashMap;

use axum::body::{to_bytes, Bytes};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::{IntoHeaderName, CONTENT_TYPE, COOKIE};
use axum::http::{Extensions, HeaderMap, HeaderValue, Method, Uri};

use super::errors::{WebError, WebResult};

/// Largest request body the binder will buffer
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Methods whose parameters travel in the body
pub fn is_state_changing(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH | Method::DELETE)
}

/// Methods whose parameters travel in the query string
pub fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
}

/// Value of cookie `name` across all `Cookie` headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    extensions: Extensions,
    body: Bytes,
    form: Option<Vec<(String, String)>>,
    match_info: HashMap<String, String>,
}

impl RequestContext {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            extensions: Extensions::new(),
            body: Bytes::new(),
            form: None,
            match_info: HashMap::new(),
        }
    }

    /// Buffer an axum request. Multipart bodies of state-changing requests
    /// are decoded into text fields here since that needs async reads.
    pub async fn from_request(
        request: Request,
        match_info: HashMap<String, String>,
    ) -> WebResult<Self> {
        let (parts, body) = request.into_parts();
        let mut ctx = Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
            extensions: parts.extensions.clone(),
            body: Bytes::new(),
            form: None,
            match_info,
        };

        let multipart = is_state_changing(&ctx.method)
            && ctx
                .content_type()
                .map(|ct| ct.starts_with("multipart/form-data"))
                .unwrap_or(false);

        if multipart {
            let request = Request::from_parts(parts, body);
            let mut multipart = Multipart::from_request(request, &())
                .await
                .map_err(|e| WebError::bad_request(e.to_string()))?;
            let mut form = Vec::new();
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| WebError::bad_request(e.to_string()))?
            {
                let name = field.name().unwrap_or_default().to_string();
                let value = field
                    .text()
                    .await
                    .map_err(|e| WebError::bad_request(e.to_string()))?;
                form.push((name, value));
            }
            ctx.form = Some(form);
        } else {
            ctx.body = to_bytes(body, MAX_BODY_BYTES)
                .await
                .map_err(|e| WebError::bad_request(e.to_string()))?;
        }
        Ok(ctx)
    }

    pub fn with_header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_form(mut self, form: Vec<(String, String)>) -> Self {
        self.form = Some(form);
        self
    }

    pub fn with_match_info(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.match_info.insert(name.into(), value.into());
        self
    }

    pub fn with_extension<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.extensions.insert(value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Lowercased content type, `None` when absent or empty
    pub fn content_type(&self) -> Option<String> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty())
    }

    /// Value of cookie `name`
    pub fn cookie(&self, name: &str) -> Option<String> {
        cookie_value(&self.headers, name)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decoded multipart fields, if the body was multipart
    pub fn form(&self) -> Option<&[(String, String)]> {
        self.form.as_deref()
    }

    pub fn match_info(&self) -> &HashMap<String, String> {
        &self.match_info
    }

    pub fn extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }
}
