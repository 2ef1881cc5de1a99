//! HTTP handlers
//!
//! Successful responses are wrapped as `{"<key>": <payload>}`.

pub mod groups;
pub mod health;
pub mod transactions;

use axum::http::Method;
use axum::Json;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::ApiError;

/// Response body of the shape `{"<key>": <payload>}`
pub type Envelope<T> = Json<BTreeMap<&'static str, T>>;

pub fn envelope<T: Serialize>(key: &'static str, payload: T) -> Envelope<T> {
    Json(BTreeMap::from([(key, payload)]))
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Fallback for known routes hit with an unsupported method
pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method.to_string())
}
