//! Liveness probe.

use axum::Json;
use serde_json::{json, Value};

/// Returns `{"status": "healthy", "service": "auth-service"}`.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "auth-service" }))
}
