//! Repository implementations for SQLite
//!
//! Every call is a single statement run under the configured query timeout.
//! Updates are conditional on the caller's `version`, so two writers racing
//! from the same base version cannot both succeed.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use splitty_core::{Group, TokenGenerator, Transaction};
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::error::{PersistenceError, PersistenceResult};
use crate::sqlite::schema::*;

/// Attempts made to find an unused group token before giving up
pub const TOKEN_RETRY_LIMIT: usize = 3;

/// Run one statement, turning an elapsed deadline into `Timeout`
async fn timed<T, F>(timeout: Duration, query: F) -> PersistenceResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(timeout, query).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(sqlx::Error::PoolTimedOut)) => Err(PersistenceError::Timeout(timeout)),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(PersistenceError::Timeout(timeout)),
    }
}

fn is_token_collision(err: &PersistenceError) -> bool {
    match err {
        PersistenceError::Database(sqlx::Error::Database(db)) => {
            db.is_unique_violation() && db.message().contains("groups.token")
        }
        _ => false,
    }
}

// ============================================================================
// Group Repository
// ============================================================================

/// Repository for groups table
#[derive(Debug, Clone)]
pub struct GroupRepo {
    pool: SqlitePool,
    timeout: Duration,
    tokens: TokenGenerator,
}

impl GroupRepo {
    pub fn new(pool: SqlitePool, timeout: Duration, tokens: TokenGenerator) -> Self {
        Self {
            pool,
            timeout,
            tokens,
        }
    }

    /// Insert a new group, assigning `id`, `token` and `version`.
    ///
    /// A token that collides with an existing group is regenerated, up to
    /// [`TOKEN_RETRY_LIMIT`] attempts in total.
    pub async fn insert(&self, group: &mut Group) -> PersistenceResult<()> {
        let users = serde_json::to_string(&group.users)?;

        for attempt in 1..=TOKEN_RETRY_LIMIT {
            let token = self.tokens.generate();

            let result = timed(
                self.timeout,
                sqlx::query_as::<_, (i64, i64)>(
                    r#"
                    INSERT INTO groups (name, token, users)
                    VALUES (?, ?, ?)
                    RETURNING id, version
                    "#,
                )
                .bind(&group.name)
                .bind(&token)
                .bind(&users)
                .fetch_one(&self.pool),
            )
            .await;

            match result {
                Ok((id, version)) => {
                    group.id = id;
                    group.token = token;
                    group.version = version;
                    return Ok(());
                }
                Err(e) if is_token_collision(&e) => {
                    tracing::warn!(attempt, "group token collision, regenerating");
                }
                Err(e) => return Err(e),
            }
        }

        Err(PersistenceError::CannotGenerateUniqueToken {
            attempts: TOKEN_RETRY_LIMIT,
        })
    }

    /// Look up a group by id and token.
    ///
    /// A wrong id and a wrong token are both reported as `NotFound`.
    pub async fn get_by_id_and_token(&self, id: i64, token: &str) -> PersistenceResult<Group> {
        timed(
            self.timeout,
            sqlx::query_as::<_, GroupRow>(
                "SELECT id, name, token, users, version FROM groups WHERE id = ? AND token = ?",
            )
            .bind(id)
            .bind(token)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| PersistenceError::not_found("Group", id))?
        .try_into()
    }

    /// Persist `name` and `users` if the stored version still equals
    /// `group.version`, then bump `group.version`.
    ///
    /// A stale version or a deleted group is an `EditConflict`.
    pub async fn update(&self, group: &mut Group) -> PersistenceResult<()> {
        let users = serde_json::to_string(&group.users)?;

        let version = timed(
            self.timeout,
            sqlx::query_scalar::<_, i64>(
                r#"
                UPDATE groups
                SET name = ?, users = ?, version = version + 1
                WHERE id = ? AND version = ?
                RETURNING version
                "#,
            )
            .bind(&group.name)
            .bind(&users)
            .bind(group.id)
            .bind(group.version)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| PersistenceError::edit_conflict("Group", group.id))?;

        group.version = version;
        Ok(())
    }

    /// Delete a group and, by cascade, its transactions
    pub async fn delete(&self, id: i64, token: &str) -> PersistenceResult<()> {
        let result = timed(
            self.timeout,
            sqlx::query("DELETE FROM groups WHERE id = ? AND token = ?")
                .bind(id)
                .bind(token)
                .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Group", id));
        }
        Ok(())
    }
}

// ============================================================================
// Transaction Repository
// ============================================================================

/// Repository for transactions table
#[derive(Debug, Clone)]
pub struct TransactionRepo {
    pool: SqlitePool,
    timeout: Duration,
}

impl TransactionRepo {
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Insert a transaction, assigning `id` and `version`
    pub async fn insert(&self, transaction: &mut Transaction) -> PersistenceResult<()> {
        let payments = serde_json::to_string(&transaction.payments)?;

        let (id, version) = timed(
            self.timeout,
            sqlx::query_as::<_, (i64, i64)>(
                r#"
                INSERT INTO transactions (title, payments, group_id)
                VALUES (?, ?, ?)
                RETURNING id, version
                "#,
            )
            .bind(&transaction.title)
            .bind(&payments)
            .bind(transaction.group_id)
            .fetch_one(&self.pool),
        )
        .await?;

        transaction.id = id;
        transaction.version = version;
        Ok(())
    }

    /// All transactions of a group with `id > after`, ascending by id
    pub async fn get_all_after_id(
        &self,
        after: i64,
        group_id: i64,
    ) -> PersistenceResult<Vec<Transaction>> {
        let rows = timed(
            self.timeout,
            sqlx::query_as::<_, TransactionRow>(
                r#"
                SELECT id, title, payments, group_id, version
                FROM transactions
                WHERE id > ? AND group_id = ?
                ORDER BY id ASC
                "#,
            )
            .bind(after)
            .bind(group_id)
            .fetch_all(&self.pool),
        )
        .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// Single transaction, scoped to its group
    pub async fn get(&self, id: i64, group_id: i64) -> PersistenceResult<Transaction> {
        timed(
            self.timeout,
            sqlx::query_as::<_, TransactionRow>(
                r#"
                SELECT id, title, payments, group_id, version
                FROM transactions
                WHERE id = ? AND group_id = ?
                "#,
            )
            .bind(id)
            .bind(group_id)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| PersistenceError::not_found("Transaction", id))?
        .try_into()
    }

    /// Persist `title` and `payments` if the stored version still equals
    /// `transaction.version`, then bump `transaction.version`.
    ///
    /// `NotFound` when the group has no such transaction, `EditConflict`
    /// when it exists with a different version.
    pub async fn update(&self, transaction: &mut Transaction) -> PersistenceResult<()> {
        let payments = serde_json::to_string(&transaction.payments)?;

        let version = timed(
            self.timeout,
            sqlx::query_scalar::<_, i64>(
                r#"
                UPDATE transactions
                SET title = ?, payments = ?, version = version + 1
                WHERE id = ? AND group_id = ? AND version = ?
                RETURNING version
                "#,
            )
            .bind(&transaction.title)
            .bind(&payments)
            .bind(transaction.id)
            .bind(transaction.group_id)
            .bind(transaction.version)
            .fetch_optional(&self.pool),
        )
        .await?;

        if let Some(version) = version {
            transaction.version = version;
            return Ok(());
        }

        // Nothing written; only classify why
        let exists = timed(
            self.timeout,
            sqlx::query_scalar::<_, i64>("SELECT 1 FROM transactions WHERE id = ? AND group_id = ?")
                .bind(transaction.id)
                .bind(transaction.group_id)
                .fetch_optional(&self.pool),
        )
        .await?;

        match exists {
            Some(_) => Err(PersistenceError::edit_conflict("Transaction", transaction.id)),
            None => Err(PersistenceError::not_found("Transaction", transaction.id)),
        }
    }

    /// Delete a transaction, scoped to its group
    pub async fn delete(&self, id: i64, group_id: i64) -> PersistenceResult<()> {
        let result = timed(
            self.timeout,
            sqlx::query("DELETE FROM transactions WHERE id = ? AND group_id = ?")
                .bind(id)
                .bind(group_id)
                .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Transaction", id));
        }
        Ok(())
    }
}

// ============================================================================
// Database initialization
// ============================================================================

/// Create the connection pool with the configured bounds
pub async fn create_pool(config: &DatabaseConfig) -> PersistenceResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .idle_timeout(Some(config.idle_timeout()))
        .acquire_timeout(config.acquire_timeout())
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Run migrations
pub async fn run_migrations(pool: &SqlitePool) -> PersistenceResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}
