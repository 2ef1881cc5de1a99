//! # Persistence Errors
//!
//! Error types for the persistence layer. Only the failures the store can
//! tell apart are classified; everything else stays an opaque `Database`.

use std::time::Duration;
use thiserror::Error;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    // === Database errors ===
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    // === Record errors ===
    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Edit conflict: {entity} with id {id} was changed or removed")]
    EditConflict { entity: String, id: String },

    #[error("Cannot generate a unique token after {attempts} attempts")]
    CannotGenerateUniqueToken { attempts: usize },

    // === Conversion errors ===
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // === Configuration errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for PersistenceError
pub type PersistenceResult<T> = Result<T, PersistenceError>;

impl PersistenceError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn edit_conflict(entity: &str, id: impl ToString) -> Self {
        Self::EditConflict {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_edit_conflict(&self) -> bool {
        matches!(self, Self::EditConflict { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
