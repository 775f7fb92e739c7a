// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ride-Relay API Server
//!
//! Links phone numbers to ride provider accounts and relays ride requests
//! and estimates with automatically refreshed credentials.

use ride_relay::{
    config::{Config, StoreBackend},
    db::{FirestoreDb, MemoryStore, Store},
    services::RideService,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        api = %config.api_base_url,
        state_cipher = %config.state_cipher,
        "Starting Ride-Relay API"
    );

    let store: Arc<dyn Store> = match config.store_backend {
        StoreBackend::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; credentials will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let ride_service = RideService::new(&config, store)?;

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        ride_service,
    });

    // Build router
    let app = ride_relay::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ride_relay=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
