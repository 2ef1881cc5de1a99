//! # Splitty Persistence
//!
//! Persistence layer for Splitty - SQLite group and transaction stores.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                  Database                    │
//! │  ┌────────────┐  ┌───────────┐  ┌──────────┐ │
//! │  │ SqlitePool │  │ GroupRepo │  │ TxRepo   │ │
//! │  └────────────┘  └───────────┘  └──────────┘ │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use splitty_persistence::{Database, DatabaseConfig};
//!
//! let db = Database::connect(&DatabaseConfig::default()).await?;
//! db.migrate().await?;
//!
//! let mut group = Group::new("Trip", vec!["alice".into(), "bob".into()]);
//! db.groups().insert(&mut group).await?;
//! ```

pub mod config;
pub mod error;
pub mod sqlite;

pub use config::DatabaseConfig;
pub use error::{PersistenceError, PersistenceResult};
pub use sqlite::schema::{GroupRow, TransactionRow};
pub use sqlite::{create_pool, run_migrations, GroupRepo, TransactionRepo, TOKEN_RETRY_LIMIT};

use splitty_core::TokenGenerator;
use sqlx::SqlitePool;

/// Database facade - pool plus the two stores sharing it
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    groups: GroupRepo,
    transactions: TransactionRepo,
}

impl Database {
    /// Connect with the thread-local token RNG
    pub async fn connect(config: &DatabaseConfig) -> PersistenceResult<Self> {
        Self::connect_with_tokens(config, TokenGenerator::default()).await
    }

    /// Connect with an explicit token generator
    pub async fn connect_with_tokens(
        config: &DatabaseConfig,
        tokens: TokenGenerator,
    ) -> PersistenceResult<Self> {
        config.validate()?;
        let pool = create_pool(config).await?;
        let timeout = config.query_timeout();

        tracing::debug!(
            max_connections = config.max_connections,
            query_timeout = ?timeout,
            "database pool ready"
        );

        Ok(Self {
            groups: GroupRepo::new(pool.clone(), timeout, tokens),
            transactions: TransactionRepo::new(pool.clone(), timeout),
            pool,
        })
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> PersistenceResult<()> {
        run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn groups(&self) -> &GroupRepo {
        &self.groups
    }

    pub fn transactions(&self) -> &TransactionRepo {
        &self.transactions
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
