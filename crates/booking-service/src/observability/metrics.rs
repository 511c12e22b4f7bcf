//! Metrics definitions for the booking service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `booking_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `method`: HTTP methods
//! - `endpoint`: parameterized paths, unknown paths collapse to `/other`
//! - `operation`: create, cancel, occupy, release
//! - `status`: success, error, timeout
//! - `error_type`: `BookingError::kind()` values

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the Prometheus recorder and return the handle used to render
/// `/metrics`.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("booking_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.200, 0.500, 1.000, 2.000, 5.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // Inventory calls are bounded by INVENTORY_TIMEOUT_SECONDS (max 60)
        .set_buckets_for_metric(
            Matcher::Prefix("booking_inventory_request".to_string()),
            &[
                0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.000, 30.000,
            ],
        )
        .map_err(|e| format!("Failed to set inventory request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion.
///
/// Metric: `booking_http_requests_total`, `booking_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("booking_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("booking_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Replace booking and user ids with placeholders.
fn normalize_endpoint(path: &str) -> String {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    let normalized = match segments.as_slice() {
        [""] => "/",
        ["health"] => "/health",
        ["metrics"] => "/metrics",
        ["api", "bookings"] => "/api/bookings",
        ["api", "bookings", "users", _] => "/api/bookings/users/{user_id}",
        ["api", "bookings", _] => "/api/bookings/{id}",
        ["api", "bookings", _, "cancel"] => "/api/bookings/{id}/cancel",
        _ => "/other",
    };

    normalized.to_string()
}

// ============================================================================
// Booking State Machine Metrics
// ============================================================================

/// Record the outcome of a booking operation.
///
/// Metric: `booking_operations_total`
/// Labels: `operation` (create, cancel), `status`, `error_type`
pub fn record_booking_operation(operation: &str, error_type: Option<&str>) {
    let (status, error_type) = match error_type {
        Some(kind) => ("error", kind),
        None => ("success", "none"),
    };

    counter!("booking_operations_total",
        "operation" => operation.to_string(),
        "status" => status.to_string(),
        "error_type" => error_type.to_string()
    )
    .increment(1);
}

/// Record a compensating delete after a failed bed assignment.
///
/// Metric: `booking_compensating_rollbacks_total`
/// Labels: `status` (success, error)
///
/// `error` means the booking row could not be removed and needs manual repair.
pub fn record_compensating_rollback(succeeded: bool) {
    let status = if succeeded { "success" } else { "error" };
    counter!("booking_compensating_rollbacks_total", "status" => status)
    .increment(1);
}

/// Record a bed release that failed after a cancellation.
///
/// Metric: `booking_bed_release_failures_total`
pub fn record_bed_release_failure() {
    counter!("booking_bed_release_failures_total").increment(1);
}

// ============================================================================
// Inventory Metrics
// ============================================================================

/// Record a call to the bed inventory.
///
/// Metric: `booking_inventory_request_duration_seconds`, `booking_inventory_requests_total`
/// Labels: `operation` (occupy, release), `status`
pub fn record_inventory_request(operation: &str, status: &str, duration: Duration) {
    histogram!("booking_inventory_request_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("booking_inventory_requests_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
