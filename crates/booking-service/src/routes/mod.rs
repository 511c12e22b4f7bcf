//! HTTP routes for the booking service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::services::BookingService;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use common::auth::{require_auth, require_role, AuthState, RoleState};
use common::jwt::{TokenService, DEFAULT_TOKEN_TTL};
use common::types::Role;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Booking state machine.
    pub bookings: BookingService,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health` - Liveness probe - public
/// - `/metrics` - Prometheus metrics - public
/// - `/api/bookings` - POST requires authentication, GET requires admin
/// - `/api/bookings/{id}`, `/api/bookings/{id}/cancel`,
///   `/api/bookings/users/{userId}` - require authentication
/// - TraceLayer for request logging
/// - HTTP metrics middleware (outermost)
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    // Booking only verifies tokens; the TTL is unused here
    let token_service = Arc::new(TokenService::new(
        &state.config.jwt_secret,
        DEFAULT_TOKEN_TTL,
    ));
    let auth_state = Arc::new(AuthState {
        token_service: token_service.clone(),
    });
    let admin_state = Arc::new(RoleState {
        token_service,
        required_role: Role::Admin,
    });

    let public_routes = Router::new().route("/health", get(handlers::health_check));

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let admin_routes = Router::new()
        .route("/api/bookings", get(handlers::list_all_bookings))
        .route_layer(middleware::from_fn_with_state(admin_state, require_role))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/bookings", post(handlers::create_booking))
        // Static segment takes priority over `:id`
        .route(
            "/api/bookings/users/:user_id",
            get(handlers::list_user_bookings),
        )
        .route("/api/bookings/:id", get(handlers::get_booking))
        .route("/api/bookings/:id/cancel", put(handlers::cancel_booking))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(state);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer (innermost)
    // 2. TraceLayer
    // 3. http_metrics_middleware - records every response (outermost)
    public_routes
        .merge(metrics_routes)
        .merge(admin_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn(http_metrics_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
