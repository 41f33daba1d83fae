use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use nichepulse::config::{AppConfig, CliArgs};
use nichepulse::server;
use nichepulse::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nichepulse=info,tower_http=info".into()),
        )
        .init();

    let args = CliArgs::parse();
    info!("Starting nichepulse v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::from_args(args);
    info!("Data dir: {:?}", config.data_dir);
    if config.api_key.is_none() {
        warn!("No YouTube API key configured; analysis requests will fail until one is provided");
    }

    let port = config.port;
    let state = Arc::new(AppState::new(config)?);

    let router = server::build_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("nichepulse listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("nichepulse shutting down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal");
}
