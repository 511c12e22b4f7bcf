//! HTTP routes for the auth service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use common::auth::{require_auth, AuthState};
use common::jwt::TokenService;
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

    /// Issues and verifies tokens with the configured secret and TTL.
    pub token_service: Arc<TokenService>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let token_service = Arc::new(TokenService::new(&config.jwt_secret, config.token_ttl));
        Self {
            pool,
            config,
            token_service,
        }
    }
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health` - Liveness probe
/// - `/api/auth/signup`, `/api/auth/login`, `/api/auth/validate` - public
/// - `/api/auth/profile` - requires authentication
/// - TraceLayer for request logging
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>) -> Router {
    let auth_state = Arc::new(AuthState {
        token_service: state.token_service.clone(),
    });

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/validate", post(handlers::validate))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/auth/profile", get(handlers::profile))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(state);

    public_routes
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}
