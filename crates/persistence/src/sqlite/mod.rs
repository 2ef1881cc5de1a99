//! SQLite persistence module
//!
//! Repository pattern for SQLite database access.

pub mod repos;
pub mod schema;

pub use repos::{create_pool, run_migrations, GroupRepo, TransactionRepo, TOKEN_RETRY_LIMIT};
pub use schema::{GroupRow, TransactionRow};
