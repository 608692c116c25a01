//! recipebox API server
//!
//! Serves the recipe, ingredient and tag API over HTTP.
//!
//! # Configuration
//!
//! Config file (`--config`, `RECIPEBOX_CONFIG`, or
//! `~/.config/recipebox/config.yaml`):
//!
//! ```yaml
//! database_path: /var/lib/recipebox/recipebox.db
//! host: 0.0.0.0
//! port: 8080
//! ```
//!
//! Environment variables override the file:
//! - `RECIPEBOX_DATABASE_PATH`: Path to the SQLite database
//! - `RECIPEBOX_HOST`: Address to bind (default: 0.0.0.0)
//! - `RECIPEBOX_PORT`: Port to listen on (default: 8080)
//!
//! Users and tokens are managed with `recipebox-admin`.

use clap::Parser;
use recipebox::config::Config;
use recipebox::db::init_db;
use recipebox::server::{router, AppState};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "recipebox-server")]
#[command(version)]
#[command(about = "recipebox API server", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipebox=info,recipebox_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config)?;

    tracing::info!("Database: {}", config.database_path.display());
    let pool = init_db(&config.database_path).await?;

    let app = router(AppState::new(pool));

    let addr = config.socket_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
