//! Building service error types.
//!
//! Error messages returned to clients are generic for store failures; the
//! underlying driver error is logged server-side.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::error_response;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildingError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),
}

impl BuildingError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            BuildingError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BuildingError::NotFound(_) => StatusCode::NOT_FOUND,
            BuildingError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<sqlx::Error> for BuildingError {
    fn from(err: sqlx::Error) -> Self {
        BuildingError::Database(err.to_string())
    }
}

impl IntoResponse for BuildingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            BuildingError::Database(err) => {
                tracing::error!(target: "building.database", error = %err, "Database operation failed");
                error_response(status, "DATABASE_ERROR", "An internal database error occurred")
            }
            BuildingError::NotFound(message) => error_response(status, "NOT_FOUND", message),
            BuildingError::BadRequest(message) => error_response(status, "BAD_REQUEST", message),
        }
    }
}
