//! Shared application state

use splitty_persistence::Database;
use std::time::Duration;

use crate::config::ServerConfig;

/// State handed to every handler; cloning is cheap (pool handles only)
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    /// Applied to every route by the router
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            request_timeout: ServerConfig::default().request_timeout(),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
