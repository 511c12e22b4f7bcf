//! Liveness probe.

use axum::Json;
use serde_json::{json, Value};

/// Returns `{"status": "healthy", "service": "booking-service"}`.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "booking-service" }))
}
