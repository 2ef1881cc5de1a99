//! Database schema definitions
//!
//! Row types for sqlx mapping from SQLite tables.
//! Schema is defined in migrations/20260101000000_init.sql

use serde::{Deserialize, Serialize};
use splitty_core::{Group, Payment, Transaction};

use crate::error::PersistenceResult;

/// Row type for table `groups`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct GroupRow {
    pub id: i64,
    pub name: String,
    pub token: String,
    pub users: String, // JSON array stored as TEXT
    pub version: i64,
}

/// Row type for table `transactions`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: i64,
    pub title: String,
    pub payments: String, // JSON array stored as TEXT
    pub group_id: i64,
    pub version: i64,
}

// === Conversion implementations ===

impl TryFrom<GroupRow> for Group {
    type Error = crate::error::PersistenceError;

    fn try_from(row: GroupRow) -> PersistenceResult<Self> {
        Ok(Self {
            id: row.id,
            name: row.name,
            token: row.token,
            users: serde_json::from_str(&row.users)?,
            version: row.version,
        })
    }
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = crate::error::PersistenceError;

    fn try_from(row: TransactionRow) -> PersistenceResult<Self> {
        let payments: Vec<Payment> = serde_json::from_str(&row.payments)?;
        Ok(Self {
            id: row.id,
            title: row.title,
            payments,
            group_id: row.group_id,
            version: row.version,
        })
    }
}
