//! Booking service error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl. Store and
//! inventory failures are logged server-side; clients receive a generic
//! message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::error_response;
use thiserror::Error;

/// Conflict message when the user already holds an active booking.
pub const ACTIVE_BOOKING_EXISTS: &str =
    "You already have an active booking. Cancel it first to book a new bed.";

/// Conflict message when the bed is held by another active booking.
pub const BED_ALREADY_OCCUPIED: &str = "This bed is already occupied";

/// Conflict message when cancelling a booking that is no longer active.
pub const BOOKING_ALREADY_CANCELLED: &str = "Booking is already cancelled";

/// Not-found message for unknown booking ids.
pub const BOOKING_NOT_FOUND: &str = "Booking not found";

/// Booking service error type.
///
/// Maps to HTTP status codes:
/// - BadRequest: 400 Bad Request
/// - Forbidden: 403 Forbidden
/// - NotFound: 404 Not Found
/// - Conflict: 409 Conflict
/// - Database, Internal: 500 Internal Server Error
/// - InventoryUnavailable: 503 Service Unavailable
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Bed inventory unavailable: {0}")]
    InventoryUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BookingError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            BookingError::Database(_) | BookingError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            BookingError::BadRequest(_) => StatusCode::BAD_REQUEST,
            BookingError::Forbidden(_) => StatusCode::FORBIDDEN,
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::Conflict(_) => StatusCode::CONFLICT,
            BookingError::InventoryUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            BookingError::Database(_) => "database",
            BookingError::BadRequest(_) => "bad_request",
            BookingError::Forbidden(_) => "forbidden",
            BookingError::NotFound(_) => "not_found",
            BookingError::Conflict(_) => "conflict",
            BookingError::InventoryUnavailable(_) => "inventory_unavailable",
            BookingError::Internal(_) => "internal",
        }
    }
}

impl From<sqlx::Error> for BookingError {
    fn from(err: sqlx::Error) -> Self {
        BookingError::Database(err.to_string())
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            BookingError::Database(err) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "booking.database", error = %err, "Database operation failed");
                error_response(status, "DATABASE_ERROR", "An internal database error occurred")
            }
            BookingError::InventoryUnavailable(reason) => {
                tracing::warn!(target: "booking.inventory", reason = %reason, "Bed inventory unavailable");
                error_response(status, "SERVICE_UNAVAILABLE", "Failed to update bed occupancy")
            }
            BookingError::Internal(err) => {
                tracing::error!(target: "booking.internal", error = %err, "Internal error");
                error_response(status, "INTERNAL_ERROR", "An internal error occurred")
            }
            BookingError::BadRequest(message) => error_response(status, "BAD_REQUEST", message),
            BookingError::Forbidden(message) => error_response(status, "FORBIDDEN", message),
            BookingError::NotFound(message) => error_response(status, "NOT_FOUND", message),
            BookingError::Conflict(message) => error_response(status, "CONFLICT", message),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: BookingError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_conflict_keeps_message() {
        let (status, json) = body_json(BookingError::Conflict(BED_ALREADY_OCCUPIED.into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], BED_ALREADY_OCCUPIED);
        assert_eq!(json["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_inventory_detail_hidden() {
        let (status, json) = body_json(BookingError::InventoryUnavailable(
            "connect error: 10.0.0.7:8002 refused".into(),
        ))
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"], "Failed to update bed occupancy");
        assert!(!json.to_string().contains("10.0.0.7"));
    }

    #[tokio::test]
    async fn test_database_detail_hidden() {
        let (status, json) =
            body_json(BookingError::Database("deadlock detected".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "DATABASE_ERROR");
        assert!(!json.to_string().contains("deadlock"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            BookingError::BadRequest(String::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BookingError::Forbidden(String::new()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            BookingError::NotFound(String::new()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BookingError::Internal(String::new()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
