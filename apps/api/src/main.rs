mod catalog;
mod config;
mod embeddings;
mod errors;
mod llm_client;
mod models;
mod recommendation;
mod routes;
mod startup;
mod state;

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::startup::spawn_initialization;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Assessment Recommender API v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Retrieval: k={}, returning up to {} (rewrite weights {:?})",
        config.num_docs_to_retrieve, config.num_docs_to_return, config.rewrite_weights
    );

    // Serve immediately; requests see "not initialized" until the engine is published.
    let state = AppState::new();
    spawn_initialization(state.clone(), config.clone());

    // Dropping a timed-out request future cancels its in-flight provider calls.
    let app = build_router(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
