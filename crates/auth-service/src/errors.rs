//! Auth service error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl. Store and
//! hashing failures are logged server-side; clients receive a generic
//! message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::error_response;
use common::jwt::TokenError;
use thiserror::Error;

/// Message for any failed login. Does not say which part was wrong.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Auth service error type.
///
/// Maps to HTTP status codes:
/// - BadRequest: 400 Bad Request
/// - InvalidCredentials: 401 Unauthorized
/// - NotFound: 404 Not Found
/// - Conflict: 409 Conflict
/// - Database, Crypto, Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthServiceError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthServiceError::Database(_)
            | AuthServiceError::Crypto(_)
            | AuthServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthServiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthServiceError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl From<sqlx::Error> for AuthServiceError {
    fn from(err: sqlx::Error) -> Self {
        AuthServiceError::Database(err.to_string())
    }
}

impl From<TokenError> for AuthServiceError {
    fn from(err: TokenError) -> Self {
        AuthServiceError::Internal(err.to_string())
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            AuthServiceError::Database(err) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "auth.database", error = %err, "Database operation failed");
                error_response(status, "DATABASE_ERROR", "An internal database error occurred")
            }
            AuthServiceError::Crypto(err) => {
                tracing::error!(target: "auth.crypto", error = %err, "Cryptographic operation failed");
                error_response(status, "CRYPTO_ERROR", "Failed to process password")
            }
            AuthServiceError::Internal(err) => {
                tracing::error!(target: "auth.internal", error = %err, "Internal error");
                error_response(status, "INTERNAL_ERROR", "An internal error occurred")
            }
            AuthServiceError::InvalidCredentials => {
                error_response(status, "INVALID_CREDENTIALS", INVALID_CREDENTIALS)
            }
            AuthServiceError::BadRequest(message) => error_response(status, "BAD_REQUEST", message),
            AuthServiceError::NotFound(message) => error_response(status, "NOT_FOUND", message),
            AuthServiceError::Conflict(message) => error_response(status, "CONFLICT", message),
        }
    }
}
