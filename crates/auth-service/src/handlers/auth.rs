//! Account and token handlers.
//!
//! - `POST /api/auth/signup` - Create an account, returns a token
//! - `POST /api/auth/login` - Exchange credentials for a token
//! - `POST /api/auth/validate` - Verify the bearer token
//! - `GET /api/auth/profile` - Current account (behind `require_auth`)

use crate::errors::AuthServiceError;
use crate::models::{AuthResponse, LoginRequest, ProfileResponse, SignupRequest, ValidateResponse};
use crate::routes::AppState;
use crate::services::user_service::{self, Session};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use common::auth::authenticate;
use common::error::AUTH_REALM_HEADER;
use common::jwt::TokenClaims;
use std::sync::Arc;
use tracing::instrument;

fn invalid_body(_: JsonRejection) -> AuthServiceError {
    AuthServiceError::BadRequest("Invalid request body".to_string())
}

fn session_response(state: &AppState, message: &str, session: Session) -> Json<AuthResponse> {
    Json(AuthResponse {
        success: true,
        message: message.to_string(),
        token: session.token,
        expires_in: state.token_service.ttl().as_secs(),
        user: session.user,
    })
}

#[instrument(skip_all, name = "auth.handler.signup")]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthServiceError> {
    let Json(request) = payload.map_err(invalid_body)?;

    let session = user_service::signup(
        &state.pool,
        &state.token_service,
        state.config.bcrypt_cost,
        request,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        session_response(&state, "User created successfully", session),
    ))
}

#[instrument(skip_all, name = "auth.handler.login")]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AuthServiceError> {
    let Json(request) = payload.map_err(invalid_body)?;

    let session = user_service::login(&state.pool, &state.token_service, request).await?;

    Ok(session_response(&state, "Login successful", session))
}

/// Report whether the bearer token verifies.
///
/// The failure reason stays generic.
#[instrument(skip_all, name = "auth.handler.validate")]
pub async fn validate(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    match authenticate(&headers, &state.token_service) {
        Ok(claims) => Json(ValidateResponse {
            valid: true,
            claims: Some(claims),
            error: None,
        })
        .into_response(),
        Err(err) => (
            StatusCode::UNAUTHORIZED,
            [(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(AUTH_REALM_HEADER),
            )],
            Json(ValidateResponse {
                valid: false,
                claims: None,
                error: Some(err.to_string()),
            }),
        )
            .into_response(),
    }
}

#[instrument(skip_all, name = "auth.handler.profile", fields(user_id = %claims.user_id))]
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<TokenClaims>,
) -> Result<Json<ProfileResponse>, AuthServiceError> {
    let user = user_service::profile(&state.pool, &claims.user_id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        user,
    }))
}
