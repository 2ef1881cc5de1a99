//! # Error Module
//!
//! Domain errors for Splitty using thiserror.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::validator::Validator;

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// One message per failed field, all rules evaluated before reporting
    #[error("validation failed: {}", join_fields(.0))]
    Validation(BTreeMap<String, String>),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }
}

impl Validator {
    /// `Ok` if valid, otherwise the collected field errors
    pub fn finish(self) -> CoreResult<()> {
        if self.valid() {
            Ok(())
        } else {
            Err(CoreError::Validation(self.into_errors()))
        }
    }
}

fn join_fields(errors: &BTreeMap<String, String>) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field} {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}
