//! Database configuration
//!
//! Pool sizing and timeouts. Every field has a default so a partial
//! `[database]` table deserializes.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{PersistenceError, PersistenceResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. `sqlite:data/splitty.db?mode=rwc`
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default)]
    pub min_connections: u32,

    /// Seconds a pooled connection may sit idle before it is closed
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Seconds to wait for a free connection
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Seconds each store call may take before it is aborted
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
}

fn default_url() -> String {
    "sqlite:data/splitty.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_idle_timeout() -> u64 {
    900
}

fn default_acquire_timeout() -> u64 {
    3
}

fn default_query_timeout() -> u64 {
    3
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_connections: default_max_connections(),
            min_connections: 0,
            idle_timeout_secs: default_idle_timeout(),
            acquire_timeout_secs: default_acquire_timeout(),
            query_timeout_secs: default_query_timeout(),
        }
    }
}

impl DatabaseConfig {
    /// Defaults pointing at a database file
    pub fn for_path(path: &Path) -> Self {
        Self {
            url: format!("sqlite:{}?mode=rwc", path.display()),
            ..Self::default()
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn validate(&self) -> PersistenceResult<()> {
        if self.url.is_empty() {
            return Err(PersistenceError::Configuration(
                "database url must not be empty".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(PersistenceError::Configuration(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(PersistenceError::Configuration(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        if self.idle_timeout_secs == 0
            || self.acquire_timeout_secs == 0
            || self.query_timeout_secs == 0
        {
            return Err(PersistenceError::Configuration(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
