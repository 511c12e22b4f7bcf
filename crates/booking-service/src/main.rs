//! Booking Service
//!
//! Entry point for the booking service. Owns the booking lifecycle and keeps
//! bed occupancy in the building service in step with it.

use booking_service::config::Config;
use booking_service::observability::metrics::init_metrics_recorder;
use booking_service::repositories::PgBookingRepository;
use booking_service::routes::{self, AppState};
use booking_service::services::{BookingService, BuildingServiceClient};
use booking_service::MIGRATOR;
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
                .unwrap_or_else(|_| "booking_service=debug,common=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Booking Service");

    // Must be installed before any metric is recorded
    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        building_service_url = %config.building_service_url,
        inventory_timeout_secs = config.inventory_timeout.as_secs(),
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

    let inventory =
        BuildingServiceClient::new(&config.building_service_url, config.inventory_timeout)
            .map_err(|e| {
                error!("Failed to create building service client: {}", e);
                e
            })?;

    let bookings = BookingService::new(
        Arc::new(PgBookingRepository::new(db_pool)),
        Arc::new(inventory),
        config.inventory_timeout,
    );

    // Parse bind address before moving config
    let bind_address = config.bind_address.clone();

    // Create application state
    let state = Arc::new(AppState { config, bookings });

    // Build application routes
    let app = routes::build_routes(state, metrics_handle);

    // Parse bind address
    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Booking Service listening on {}", addr);

    // Start server with graceful shutdown support
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Booking Service shutdown complete");

    Ok(())
}
