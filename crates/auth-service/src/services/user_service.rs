//! Signup, login and profile lookup.

use crate::errors::AuthServiceError;
use crate::models::{LoginRequest, SignupRequest, User};
use crate::repositories::{UsersRepository, EMAIL_TAKEN};
use crate::services::password::{hash_password, verify_password, DUMMY_HASH};
use chrono::Utc;
use common::jwt::TokenService;
use common::secret::{ExposeSecret, SecretString};
use common::types::Role;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A user together with a freshly issued token.
#[derive(Debug)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Non-empty after trimming.
fn present(value: &str) -> bool {
    !value.trim().is_empty()
}

fn non_empty_secret(secret: Option<SecretString>) -> Option<SecretString> {
    secret.filter(|s| !s.expose_secret().is_empty())
}

fn parse_role(raw: Option<&str>) -> Result<Role, AuthServiceError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Role::default()),
        Some(value) => value.parse().map_err(|_| {
            AuthServiceError::BadRequest("Role must be either student or admin".to_string())
        }),
    }
}

/// Register a new account and issue its first token.
///
/// # Errors
///
/// - `BadRequest` if email, password or name is missing, the password is
///   shorter than 6 characters, or the role is unknown
/// - `Conflict` if the email is already registered
#[instrument(skip_all, name = "auth.service.signup")]
pub async fn signup(
    pool: &PgPool,
    tokens: &TokenService,
    bcrypt_cost: u32,
    request: SignupRequest,
) -> Result<Session, AuthServiceError> {
    let password = non_empty_secret(request.password);
    let (Some(password), true, true) = (password, present(&request.email), present(&request.name))
    else {
        return Err(AuthServiceError::BadRequest(
            "Email, password, and name are required".to_string(),
        ));
    };

    if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthServiceError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let role = parse_role(request.role.as_deref())?;

    // Fast path; the unique constraint decides races
    if UsersRepository::get_by_email(pool, &request.email)
        .await?
        .is_some()
    {
        return Err(AuthServiceError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let password_hash = hash_password(password, bcrypt_cost).await?;

    let now = Utc::now();
    let user = UsersRepository::create_user(
        pool,
        &User {
            id: Uuid::new_v4().to_string(),
            email: request.email,
            name: request.name.trim().to_string(),
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    let token = tokens.issue(&user.subject())?;

    tracing::info!(target: "auth.service", user_id = %user.id, role = %user.role, "User signed up");

    Ok(Session { token, user })
}

/// Check credentials and issue a token.
///
/// # Errors
///
/// - `BadRequest` if email or password is missing
/// - `InvalidCredentials` for an unknown email or a wrong password
#[instrument(skip_all, name = "auth.service.login")]
pub async fn login(
    pool: &PgPool,
    tokens: &TokenService,
    request: LoginRequest,
) -> Result<Session, AuthServiceError> {
    let (Some(password), true) = (non_empty_secret(request.password), present(&request.email))
    else {
        return Err(AuthServiceError::BadRequest(
            "Email and password are required".to_string(),
        ));
    };

    let Some(user) = UsersRepository::get_by_email(pool, &request.email).await? else {
        // Same bcrypt work as a real check
        let _ = verify_password(password, DUMMY_HASH.to_string()).await;
        tracing::debug!(target: "auth.service", "Login for unknown email");
        return Err(AuthServiceError::InvalidCredentials);
    };

    if !verify_password(password, user.password_hash.clone()).await? {
        tracing::debug!(target: "auth.service", user_id = %user.id, "Login with wrong password");
        return Err(AuthServiceError::InvalidCredentials);
    }

    let token = tokens.issue(&user.subject())?;

    tracing::info!(target: "auth.service", user_id = %user.id, "User logged in");

    Ok(Session { token, user })
}

/// Current account for a verified token.
///
/// # Errors
///
/// `NotFound` if the account no longer exists.
#[instrument(skip_all, name = "auth.service.profile", fields(user_id = %user_id))]
pub async fn profile(pool: &PgPool, user_id: &str) -> Result<User, AuthServiceError> {
    UsersRepository::get_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AuthServiceError::NotFound("User not found".to_string()))
}
