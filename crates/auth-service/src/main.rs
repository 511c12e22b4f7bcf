//! Auth Service
//!
//! Entry point for the auth service. Handles signup and login and issues the
//! tokens every other service verifies.

use auth_service::config::Config;
use auth_service::routes::{self, AppState};
use auth_service::MIGRATOR;
use common::shutdown::shutdown_signal;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,common=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Auth Service");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        token_ttl_secs = config.token_ttl.as_secs(),
        bcrypt_cost = config.bcrypt_cost,
        "Configuration loaded successfully"
    );

    // Initialize database connection pool with query timeout
    info!("Connecting to database...");
    let db_pool = config.database.connect().await.map_err(|e| {
        error!("Failed to connect to database: {}", e);
        e
    })?;

    info!("Database connection established");

    MIGRATOR.run(&db_pool).await.map_err(|e| {
        error!("Failed to apply migrations: {}", e);
        e
    })?;

    // Parse bind address before moving config
    let bind_address = config.bind_address.clone();

    // Create application state
    let state = Arc::new(AppState::new(db_pool, config));

    // Build application routes
    let app = routes::build_routes(state);

    // Parse bind address
    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Auth Service listening on {}", addr);

    // Start server with graceful shutdown support
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Auth Service shutdown complete");

    Ok(())
}
