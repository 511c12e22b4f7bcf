//! Password hashing.
//!
//! bcrypt is CPU-bound, so both operations run on the blocking pool.

use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::errors::AuthServiceError;
use common::secret::{ExposeSecret, SecretString};
use tracing::instrument;

/// Valid bcrypt hash of a random value, checked when the email is unknown so
/// that login takes the same time either way.
pub const DUMMY_HASH: &str = "$2b$12$LQv3c1yqBWVHxkd0LHAkCOYz6TtxMQJqhN8/LewY5GyYqExt7YD3a";

/// Hash a password with bcrypt.
///
/// # Errors
///
/// Returns `AuthServiceError::Crypto` if `cost` is outside 10-14 or hashing
/// fails.
#[instrument(skip_all)]
pub async fn hash_password(password: SecretString, cost: u32) -> Result<String, AuthServiceError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(AuthServiceError::Crypto(format!(
            "Invalid bcrypt cost: {cost} (must be {MIN_BCRYPT_COST}-{MAX_BCRYPT_COST})"
        )));
    }

    tokio::task::spawn_blocking(move || bcrypt::hash(password.expose_secret(), cost))
        .await
        .map_err(|e| AuthServiceError::Internal(format!("hashing task failed: {e}")))?
        .map_err(|e| AuthServiceError::Crypto(format!("Password hashing failed: {e}")))
}

/// Check a password against a bcrypt hash.
///
/// # Errors
///
/// Returns `AuthServiceError::Crypto` if `hash` is not a bcrypt hash.
#[instrument(skip_all)]
pub async fn verify_password(
    password: SecretString,
    hash: String,
) -> Result<bool, AuthServiceError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password.expose_secret(), &hash))
        .await
        .map_err(|e| AuthServiceError::Internal(format!("verification task failed: {e}")))?
        .map_err(|e| AuthServiceError::Crypto(format!("Password verification failed: {e}")))
}
