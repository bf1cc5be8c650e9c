//! # Handler Contract
//!
//! Handlers receive the application state and the bound `CallArgs`, and
//! return a `Reply`. Failures are either domain errors (sent back as a JSON
//! payload) or faults (sent back as 500).

use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::{Map, Value};
use thiserror::Error;

use super::reply::Reply;
use super::request::RequestContext;
use crate::api::ApiError;
use crate::orm::OrmError;

/// Handler failure
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Domain error, answered with its payload
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Orm(#[from] OrmError),

    #[error("{0}")]
    Internal(String),
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::Internal(err.to_string())
    }
}

pub type HandlerResult = Result<Reply, HandlerError>;

pub type HandlerFuture = BoxFuture<'static, HandlerResult>;

/// Type-erased handler over state `S`
pub type HandlerFn<S> = Arc<dyn Fn(S, CallArgs) -> HandlerFuture + Send + Sync>;

/// Keyword arguments bound for one call, plus the request when asked for
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    values: Map<String, Value>,
    request: Option<Arc<RequestContext>>,
}

impl CallArgs {
    pub fn new(values: Map<String, Value>) -> Self {
        Self {
            values,
            request: None,
        }
    }

    pub fn with_request(mut self, request: Arc<RequestContext>) -> Self {
        self.request = Some(request);
        self
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_values(self) -> Map<String, Value> {
        self.values
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Argument as text; numbers and booleans are rendered, null is absent
    pub fn text(&self, name: &str) -> Option<String> {
        match self.values.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Argument as trimmed text, empty when missing
    pub fn trimmed(&self, name: &str) -> String {
        self.text(name).map(|s| s.trim().to_string()).unwrap_or_default()
    }

    pub fn request(&self) -> Option<&RequestContext> {
        self.request.as_deref()
    }

    pub fn has_request(&self) -> bool {
        self.request.is_some()
    }
}
