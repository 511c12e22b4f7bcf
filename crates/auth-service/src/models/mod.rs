//! Data models for the auth service.

use crate::errors::AuthServiceError;
use chrono::{DateTime, Utc};
use common::jwt::{TokenClaims, TokenSubject};
use common::secret::SecretString;
use common::types::Role;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// User row as stored.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user account. `password_hash` is never serialized.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &"[REDACTED]")
            .field("name", &self.name)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl User {
    /// Identity to issue a token for.
    pub fn subject(&self) -> TokenSubject {
        TokenSubject {
            user_id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = AuthServiceError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|e| AuthServiceError::Internal(format!("stored user has {e}")))?;
        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Body of `POST /api/auth/signup`.
///
/// Fields are optional at the JSON level so that a missing field yields the
/// service's own validation message.
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: Option<SecretString>,
    #[serde(default)]
    pub name: String,
    /// `student` or `admin`; defaults to `student`.
    #[serde(default)]
    pub role: Option<String>,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: Option<SecretString>,
}

/// Signup and login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    pub user: User,
}

/// Profile response.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: User,
}

/// Token validation response.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims: Option<TokenClaims>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
