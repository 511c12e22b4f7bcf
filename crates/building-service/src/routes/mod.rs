//! HTTP routes for the building service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use axum::{
    routing::{get, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: PgPool,

    /// Service configuration.
    pub config: Config,
}

/// Build the application routes.
///
/// All routes are public: the inventory is readable by anyone and the
/// occupancy endpoint is reached only by the booking service on the
/// internal network.
pub fn build_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/buildings", get(handlers::list_buildings))
        // Static segments take priority over `:id`
        .route("/api/buildings/search", get(handlers::search_buildings))
        .route("/api/buildings/:id", get(handlers::get_building))
        .route(
            "/api/buildings/:id/rooms/:room_id",
            get(handlers::get_room),
        )
        .route(
            "/api/buildings/beds/:bed_id/occupancy",
            put(handlers::update_bed_occupancy),
        )
        .route(
            "/api/buildings/users/:user_id/beds",
            get(handlers::get_beds_for_user),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}
