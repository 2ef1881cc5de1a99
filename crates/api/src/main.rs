//! Splitty server
//!
//! Usage:
//! ```bash
//! splitty --config splitty.toml serve
//! splitty --database-url "sqlite:data/splitty.db?mode=rwc" migrate
//! SPLITTY_DATABASE_URL="sqlite:/var/lib/splitty.db" splitty serve
//! ```
//!
//! Flags beat environment variables, which beat the config file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use splitty_api::server;
use splitty_api::AppConfig;

/// Splitty - shared expense ledger server
#[derive(Parser)]
#[command(name = "splitty")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, short, global = true, env = "SPLITTY_CONFIG")]
    config: Option<PathBuf>,

    /// Override server.listen
    #[arg(long, global = true, env = "SPLITTY_LISTEN")]
    listen: Option<SocketAddr>,

    /// Override database.url
    #[arg(long, global = true, env = "SPLITTY_DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Apply migrations and serve the HTTP API (default)
    Serve,
    /// Apply migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(listen) = cli.listen {
        config.server.listen = listen;
    }
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    config.validate()?;

    server::init_tracing(&config.server.log_level);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => server::serve(config).await?,
        Commands::Migrate => {
            let db = server::open_database(&config).await?;
            db.close().await;
            tracing::info!(url = %config.database.url, "migrations applied");
        }
    }

    Ok(())
}
