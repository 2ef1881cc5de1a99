//! # Splitty API
//!
//! HTTP surface for the Splitty expense ledger.
//!
//! ```text
//! request ─▶ router ─▶ GroupAccess (id + token) ─▶ handler ─▶ GroupRepo / TransactionRepo
//!                                                      │
//!                                                      └─▶ validate_* before any write
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use auth::{authenticate, GroupAccess};
pub use config::{AppConfig, ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::AppState;
