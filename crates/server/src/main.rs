//! vid-lookup server entry point.
//!
//! Boots the HTTP API: opens the cache database, wires the shared browser
//! session and resolver, and serves until interrupted. The browser is
//! closed after the listener drains.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use vidlookup_client::{CatalogResolver, SessionConfig, SessionManager};
use vidlookup_core::{AppConfig, CacheDb};

mod error;
mod routes;
mod state;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        db_path = %config.db_path.display(),
        catalog = %config.catalog_base_url,
        "starting vid-lookup server"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let sessions = Arc::new(SessionManager::new(SessionConfig {
        launch_timeout: config.launch_timeout(),
    }));
    let resolver = Arc::new(CatalogResolver::new(
        Arc::clone(&sessions),
        config.catalog_base_url.clone(),
        config.resolve_timeout(),
    ));

    let app = routes::build_router(state::AppState { db, resolver });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sessions.release().await;
    tracing::info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install ctrl-c handler");
    }
}
