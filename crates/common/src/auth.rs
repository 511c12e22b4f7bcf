//! Bearer-token guards for protected routes.
//!
//! Provides two middleware functions:
//! - `require_auth` - any valid token
//! - `require_role` - a valid token carrying a specific role
//!
//! Both read the `Authorization` header, verify the token with the shared
//! [`TokenService`], and inject the verified [`TokenClaims`] into request
//! extensions. Handlers read them back with `Extension<TokenClaims>`.

use crate::error::error_response;
use crate::jwt::{TokenClaims, TokenService};
use crate::types::Role;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Scheme prefix stripped from the header value.
const BEARER_PREFIX: &str = "Bearer ";

/// Reasons a request is turned away at the gate.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header, or an empty one.
    #[error("No authorization token provided")]
    MissingToken,

    /// Token failed verification.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Token is valid but lacks the required role.
    #[error("Insufficient permissions")]
    Forbidden,
}

impl AuthError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    const fn code(self) -> &'static str {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken => "UNAUTHORIZED",
            AuthError::Forbidden => "FORBIDDEN",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.code(), self.to_string())
    }
}

/// State for `require_auth`.
#[derive(Clone)]
pub struct AuthState {
    /// Shared token verifier.
    pub token_service: Arc<TokenService>,
}

/// State for `require_role`.
#[derive(Clone)]
pub struct RoleState {
    /// Shared token verifier.
    pub token_service: Arc<TokenService>,
    /// Role the caller must hold.
    pub required_role: Role,
}

/// Strip a leading `"Bearer "` from a header value.
///
/// The prefix is only removed when something follows it; any other value
/// (including a bare token) is returned unchanged.
#[must_use]
pub fn extract_token(header_value: &str) -> &str {
    match header_value.strip_prefix(BEARER_PREFIX) {
        Some(rest) if !rest.is_empty() => rest,
        _ => header_value,
    }
}

/// Verify the request's bearer token.
///
/// # Errors
///
/// - `AuthError::MissingToken` if the header is absent or empty
/// - `AuthError::InvalidToken` if the token does not verify
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<TokenClaims, AuthError> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| AuthError::InvalidToken))
        .transpose()?
        .unwrap_or_default();

    if raw.is_empty() {
        tracing::debug!(target: "common.auth", "Missing Authorization header");
        return Err(AuthError::MissingToken);
    }

    tokens.verify(extract_token(raw)).map_err(|_| {
        tracing::debug!(target: "common.auth", "Rejected bearer token");
        AuthError::InvalidToken
    })
}

/// Authentication middleware.
///
/// # Response
///
/// - 401 Unauthorized if the token is missing or invalid
/// - Otherwise continues with `TokenClaims` in extensions
#[instrument(skip_all, name = "common.auth.require_auth")]
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = authenticate(req.headers(), &state.token_service)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Role-gated authentication middleware.
///
/// # Response
///
/// - 401 Unauthorized if the token is missing or invalid
/// - 403 Forbidden if the token's role differs from `required_role`
/// - Otherwise continues with `TokenClaims` in extensions
#[instrument(skip_all, name = "common.auth.require_role")]
pub async fn require_role(
    State(state): State<Arc<RoleState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = authenticate(req.headers(), &state.token_service)?;

    if !claims.has_role(state.required_role) {
        tracing::debug!(
            target: "common.auth",
            user_id = %claims.user_id,
            role = %claims.role,
            "Role check failed"
        );
        return Err(AuthError::Forbidden);
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::jwt::{TokenSubject, DEFAULT_TOKEN_TTL};
    use crate::secret::SecretString;
    use axum::{body::Body, http::Request as HttpRequest, middleware, routing::get, Extension, Router};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new(
            &SecretString::from("gate-secret"),
            DEFAULT_TOKEN_TTL,
        ))
    }

    fn token_for(tokens: &TokenService, role: Role) -> String {
        tokens
            .issue(&TokenSubject {
                user_id: "u-1".to_string(),
                email: "u1@example.com".to_string(),
                name: "Pema".to_string(),
                role,
            })
            .unwrap()
    }

    async fn whoami(Extension(claims): Extension<TokenClaims>) -> String {
        claims.user_id
    }

    fn app(tokens: Arc<TokenService>) -> Router {
        let auth_state = Arc::new(AuthState {
            token_service: tokens.clone(),
        });
        let admin_state = Arc::new(RoleState {
            token_service: tokens,
            required_role: Role::Admin,
        });

        Router::new()
            .route(
                "/me",
                get(whoami).route_layer(middleware::from_fn_with_state(auth_state, require_auth)),
            )
            .route(
                "/admin",
                get(whoami).route_layer(middleware::from_fn_with_state(admin_state, require_role)),
            )
    }

    async fn send(app: Router, path: &str, auth: Option<&str>) -> (StatusCode, HeaderMap, String) {
        let mut builder = HttpRequest::builder().uri(path);
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token("Bearer abc"), "abc");
        assert_eq!(extract_token("abc"), "abc");
        // Bare prefix is not stripped
        assert_eq!(extract_token("Bearer "), "Bearer ");
        // Scheme match is exact
        assert_eq!(extract_token("bearer abc"), "bearer abc");
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let (status, headers, body) = send(app(tokens()), "/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(headers.get(header::WWW_AUTHENTICATE).is_some());
        assert!(body.contains("No authorization token provided"));
    }

    #[tokio::test]
    async fn test_empty_header_is_unauthorized() {
        let (status, _, body) = send(app(tokens()), "/me", Some("")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("No authorization token provided"));
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthorized() {
        let (status, _, body) = send(app(tokens()), "/me", Some("Bearer nope")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Invalid or expired token"));
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler_with_claims() {
        let tokens = tokens();
        let token = token_for(&tokens, Role::Student);

        let (status, _, body) =
            send(app(tokens.clone()), "/me", Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "u-1");

        // Bare token without the scheme is also accepted
        let (status, _, _) = send(app(tokens), "/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_role_gate() {
        let tokens = tokens();
        let student = token_for(&tokens, Role::Student);
        let admin = token_for(&tokens, Role::Admin);

        let (status, headers, body) =
            send(app(tokens.clone()), "/admin", Some(&format!("Bearer {student}"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(headers.get(header::WWW_AUTHENTICATE).is_none());
        assert!(body.contains("Insufficient permissions"));

        let (status, _, _) =
            send(app(tokens.clone()), "/admin", Some(&format!("Bearer {admin}"))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, _) = send(app(tokens), "/admin", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
