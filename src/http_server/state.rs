//! Shared state handed to every handler.

use std::sync::Arc;

use crate::config::SessionConfig;
use crate::orm::Database;

#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub session: Arc<SessionConfig>,
}

impl AppState {
    pub fn new(db: Database, session: SessionConfig) -> Self {
        Self {
            db,
            session: Arc::new(session),
        }
    }
}
