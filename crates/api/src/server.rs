//! Server lifecycle: logging, database, listener, graceful shutdown

use anyhow::{Context, Result};
use std::future::IntoFuture;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use splitty_persistence::Database;

use crate::config::AppConfig;
use crate::routes::router;
use crate::state::AppState;

/// Install the global tracing subscriber. `RUST_LOG` wins over `level`.
pub fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{level},tower_http={level},sqlx=warn").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Create the parent directory of a file-backed SQLite URL
pub fn ensure_database_dir(url: &str) -> std::io::Result<()> {
    let Some(rest) = url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let path = rest.trim_start_matches("//");
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(':') {
        return Ok(());
    }
    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Connect and apply migrations
pub async fn open_database(config: &AppConfig) -> Result<Database> {
    ensure_database_dir(&config.database.url)
        .with_context(|| format!("Failed to create directory for {}", config.database.url))?;

    let db = Database::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to run migrations")?;

    Ok(db)
}

/// Serve until SIGINT/SIGTERM, then drain for at most the shutdown timeout
pub async fn serve(config: AppConfig) -> Result<()> {
    let db = open_database(&config).await?;
    let state = AppState::new(db.clone()).with_request_timeout(config.server.request_timeout());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.server.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen))?;
    tracing::info!(addr = %config.server.listen, "starting server");

    let signalled = Arc::new(Notify::new());
    let trigger = Arc::clone(&signalled);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            trigger.notify_one();
        })
        .into_future();

    let shutdown_timeout = config.server.shutdown_timeout();
    tokio::select! {
        result = server => result.context("Server error")?,
        _ = async {
            signalled.notified().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            tracing::warn!(timeout = ?shutdown_timeout, "shutdown timeout elapsed, dropping open connections");
        }
    }

    db.close().await;
    tracing::info!(addr = %config.server.listen, "stopped server");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!(signal = "SIGINT", "shutting down server"),
        _ = terminate => tracing::info!(signal = "SIGTERM", "shutting down server"),
    }
}
