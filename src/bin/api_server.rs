// src/bin/api_server.rs

use anyhow::Context;
use clap::Parser;
use json_rest_server::infra::logging;
use json_rest_server::transport;
use json_rest_server::{DocumentService, ServerConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = ServerConfig::parse();
    logging::init(config.log_json);

    let root = config.canonical_root()?;
    let addr = config.socket_addr()?;

    let service = Arc::new(DocumentService::new(root.clone()));
    let app_state = transport::http::AppState::new(service, &config);
    let app = transport::http::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let local_addr = listener.local_addr()?;

    tracing::info!("Server running at http://{}", local_addr);
    tracing::info!("Serving directory {}", root.display());
    tracing::info!("CORS enabled: {}", config.cors);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server closed on error")?;

    tracing::info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received (Ctrl+C)...");
}
