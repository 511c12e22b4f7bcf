//! JSON error body shared by every hostel service.
//!
//! Each service owns its own error enum; they all render through
//! [`error_response`] so clients see one shape:
//!
//! ```json
//! { "success": false, "error": "This bed is already occupied", "code": "CONFLICT" }
//! ```

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Realm announced in `WWW-Authenticate` on 401 responses.
pub const AUTH_REALM_HEADER: &str = "Bearer realm=\"hostel-api\"";

/// Error body returned by all endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Human-readable message, safe to show to clients.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
}

impl ErrorResponse {
    /// Build an error body.
    #[must_use]
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
            code: code.to_string(),
        }
    }
}

/// Render an error body with `status`.
///
/// 401 responses also carry a `WWW-Authenticate` header.
#[must_use]
pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    let mut response = (status, Json(ErrorResponse::new(code, message))).into_response();

    if status == StatusCode::UNAUTHORIZED {
        response.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static(AUTH_REALM_HEADER),
        );
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_error_response_body_shape() {
        let response = error_response(StatusCode::CONFLICT, "CONFLICT", "taken");
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "taken");
        assert_eq!(json["code"], "CONFLICT");
    }

    #[test]
    fn test_unauthorized_carries_www_authenticate() {
        let response = error_response(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "no");
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            AUTH_REALM_HEADER
        );
    }
}
