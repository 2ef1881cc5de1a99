//! API errors
//!
//! Every failure leaves the server as `{"error": <message or field map>}`.
//! Storage details are logged, never sent to the client.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use splitty_core::CoreError;
use splitty_persistence::PersistenceError;
use std::collections::BTreeMap;
use thiserror::Error;

const INTERNAL_MESSAGE: &str = "the server encountered a problem and could not process your request";

#[derive(Debug, Error)]
pub enum ApiError {
    // === Client errors ===
    #[error("{0}")]
    BadRequest(String),

    #[error("validation failed")]
    Validation(BTreeMap<String, String>),

    #[error("the requested resource could not be found")]
    NotFound,

    #[error("the {0} method is not supported for this resource")]
    MethodNotAllowed(String),

    #[error("unable to update the record due to an edit conflict, please try again")]
    EditConflict,

    // === Server errors ===
    #[error("the request timed out")]
    Timeout,

    #[error("storage error: {0}")]
    Storage(#[source] PersistenceError),
}

/// Result type alias for handlers
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::EditConflict => StatusCode::CONFLICT,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound { .. } => ApiError::NotFound,
            PersistenceError::EditConflict { .. } => ApiError::EditConflict,
            PersistenceError::Timeout(_) => ApiError::Timeout,
            other => ApiError::Storage(other),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(errors) => ApiError::Validation(errors),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        ApiError::bad_request("invalid id parameter")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        let body = match self {
            ApiError::Validation(errors) => json!({ "error": errors }),
            ApiError::Storage(_) => json!({ "error": INTERNAL_MESSAGE }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
