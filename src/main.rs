use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use finance_tracker_api::app::app;
use finance_tracker_api::config::config;
use finance_tracker_api::database::{DatabaseManager, PgStore};
use finance_tracker_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(config().clone());
    tracing::info!("Starting Finance Tracker API in {:?} mode", config.environment);

    // Pools connect on first use; a missing DATABASE_URL surfaces then.
    let manager = Arc::new(DatabaseManager::new(config.clone()));
    let store = Arc::new(PgStore::new(manager.clone()));
    let router = app(AppState::new(config.clone(), store));

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    manager.close().await;
    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
