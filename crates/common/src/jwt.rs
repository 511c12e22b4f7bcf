//! Token issuance and verification shared by the hostel services.
//!
//! Tokens are compact `header.payload.signature` JWTs signed with HS256 and a
//! service-wide secret. The claims are a fixed, strongly typed structure
//! ([`TokenClaims`]); a token whose payload is missing a field or carries a
//! field of the wrong type is rejected rather than partially trusted.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing
//! - Only HS256 is accepted; tokens announcing any other algorithm are rejected
//! - Validity window is `iat <= now < exp`, no leeway
//! - Every verification failure collapses into [`TokenError::InvalidToken`];
//!   the concrete reason is only logged at debug level
//! - The `email` claim is redacted in Debug output
//!
//! # Usage
//!
//! ```rust,ignore
//! use common::jwt::{token_ttl_from_env_value, TokenService, TokenSubject};
//!
//! let tokens = TokenService::new(&secret, token_ttl_from_env_value(Some("12h")));
//! let token = tokens.issue(&subject)?;
//! let claims = tokens.verify(&token)?;
//! ```

use crate::secret::{ExposeSecret, SecretString};
use crate::types::Role;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum accepted token size in bytes (8KB).
///
/// Oversized tokens are rejected before any base64 decoding or MAC work.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Token lifetime used when `JWT_EXPIRY` is absent or unusable.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// The only signing algorithm issued or accepted.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

// =============================================================================
// Error Types
// =============================================================================

/// Errors produced by the token service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token failed verification. Deliberately carries no sub-reason.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The claims could not be signed.
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

// =============================================================================
// Claims Types
// =============================================================================

/// Identity a token is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    /// User account id.
    pub user_id: String,
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Account role.
    pub role: Role,
}

/// Decoded token payload.
///
/// Field names are the wire names (`iat`/`exp` are Unix epoch seconds).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User account id.
    pub user_id: String,

    /// Login email - redacted in Debug output.
    pub email: String,

    /// Display name.
    pub name: String,

    /// Account role at issuance.
    pub role: Role,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,
}

impl fmt::Debug for TokenClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenClaims")
            .field("user_id", &self.user_id)
            .field("email", &"[REDACTED]")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

impl TokenClaims {
    /// Whether `now` falls inside `iat <= now < exp`.
    #[must_use]
    pub fn is_valid_at(&self, now: i64) -> bool {
        self.iat <= now && now < self.exp
    }

    /// Whether the token was issued for `role`.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// The identity fields, without timestamps.
    #[must_use]
    pub fn subject(&self) -> TokenSubject {
        TokenSubject {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}

// =============================================================================
// TTL parsing
// =============================================================================

/// Resolve the token lifetime from the raw `JWT_EXPIRY` value.
///
/// Accepts Go-style durations (`24h`, `90m`, `1h30m`, `1.5h`, `45s`). Absent,
/// unparseable, or sub-second values fall back to [`DEFAULT_TOKEN_TTL`]
/// without error: issuance must never fail because of this setting.
#[must_use]
pub fn token_ttl_from_env_value(raw: Option<&str>) -> Duration {
    match raw.and_then(parse_duration) {
        Some(ttl) if ttl.as_secs() >= 1 => ttl,
        _ => {
            if let Some(value) = raw {
                tracing::debug!(
                    target: "common.jwt",
                    value = %value,
                    "Unusable token TTL, falling back to default"
                );
            }
            DEFAULT_TOKEN_TTL
        }
    }
}

/// Parse a sequence of `<number><unit>` pairs.
fn parse_duration(input: &str) -> Option<Duration> {
    let mut rest = input.trim();
    if rest.is_empty() {
        return None;
    }

    let mut total_secs = 0f64;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return None;
        }
        let (number, tail) = rest.split_at(number_len);
        let value: f64 = number.parse().ok()?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let scale = match unit {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return None,
        };

        total_secs += value * scale;
        rest = tail;
    }

    Duration::try_from_secs_f64(total_secs).ok()
}

// =============================================================================
// Token Service
// =============================================================================

/// Issues and verifies HS256 identity tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &TOKEN_ALGORITHM)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service for `secret` issuing tokens valid for `ttl`.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.algorithms = vec![TOKEN_ALGORITHM];
        validation.set_required_spec_claims(&["exp"]);
        validation.validate_aud = false;
        // The iat/exp window is checked in `verify_at` against a single `now`.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret_bytes),
            decoding_key: DecodingKey::from_secret(secret_bytes),
            validation,
            ttl,
        }
    }

    /// Lifetime of issued tokens.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject`, valid from now for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the claims cannot be encoded.
    pub fn issue(&self, subject: &TokenSubject) -> Result<String, TokenError> {
        self.issue_at(subject, chrono::Utc::now().timestamp())
    }

    /// Issue a token for `subject` with an explicit `iat`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the claims cannot be encoded.
    pub fn issue_at(&self, subject: &TokenSubject, issued_at: i64) -> Result<String, TokenError> {
        let ttl_secs = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = TokenClaims {
            user_id: subject.user_id.clone(),
            email: subject.email.clone(),
            name: subject.name.clone(),
            role: subject.role,
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims with the service secret.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the claims cannot be encoded.
    pub fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        encode(&Header::new(TOKEN_ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify `token` against the current time.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidToken` for any malformed, tampered,
    /// wrongly-signed, or expired token.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    /// Verify `token` against an explicit `now` (Unix epoch seconds).
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidToken` for any malformed, tampered,
    /// wrongly-signed, or out-of-window token.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<TokenClaims, TokenError> {
        if token.len() > MAX_JWT_SIZE_BYTES {
            tracing::debug!(
                target: "common.jwt",
                token_size = token.len(),
                max_size = MAX_JWT_SIZE_BYTES,
                "Token rejected: size exceeds maximum allowed"
            );
            return Err(TokenError::InvalidToken);
        }

        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| {
                tracing::debug!(
                    target: "common.jwt",
                    error = %e,
                    alg = header_algorithm(token).as_deref().unwrap_or("unreadable"),
                    "Token rejected: verification failed"
                );
                TokenError::InvalidToken
            },
        )?;

        let claims = data.claims;
        if !claims.is_valid_at(now) {
            tracing::debug!(
                target: "common.jwt",
                iat = claims.iat,
                exp = claims.exp,
                now = now,
                "Token rejected: outside validity window"
            );
            return Err(TokenError::InvalidToken);
        }

        Ok(claims)
    }
}

/// Read the `alg` field of a token header without verifying anything.
///
/// Feeds the rejection log only; never make an access decision on it.
fn header_algorithm(token: &str) -> Option<String> {
    let header_part = token.split('.').next()?;
    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).ok()?;
    let header: serde_json::Value = serde_json::from_slice(&header_bytes).ok()?;
    header.get("alg")?.as_str().map(ToString::to_string)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::cast_possible_wrap
)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn service() -> TokenService {
        TokenService::new(&SecretString::from("test-secret"), DEFAULT_TOKEN_TTL)
    }

    fn subject() -> TokenSubject {
        TokenSubject {
            user_id: "3f1c2a4e-5b6d-4c7e-8f90-a1b2c3d4e5f6".to_string(),
            email: "tenzin@example.com".to_string(),
            name: "Tenzin".to_string(),
            role: Role::Student,
        }
    }

    // -------------------------------------------------------------------------
    // TTL Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_default_ttl_is_24_hours() {
        assert_eq!(DEFAULT_TOKEN_TTL, Duration::from_secs(86_400));
    }

    #[test]
    fn test_ttl_parses_go_durations() {
        assert_eq!(
            token_ttl_from_env_value(Some("24h")),
            Duration::from_secs(86_400)
        );
        assert_eq!(
            token_ttl_from_env_value(Some("90m")),
            Duration::from_secs(5_400)
        );
        assert_eq!(
            token_ttl_from_env_value(Some("1h30m")),
            Duration::from_secs(5_400)
        );
        assert_eq!(
            token_ttl_from_env_value(Some("1.5h")),
            Duration::from_secs(5_400)
        );
        assert_eq!(
            token_ttl_from_env_value(Some("45s")),
            Duration::from_secs(45)
        );
    }

    #[test]
    fn test_ttl_falls_back_silently() {
        for raw in [None, Some(""), Some("soon"), Some("24"), Some("h"), Some("1.2.3h"), Some("0s"), Some("500ms")] {
            assert_eq!(
                token_ttl_from_env_value(raw),
                DEFAULT_TOKEN_TTL,
                "{raw:?} should fall back"
            );
        }
    }

    // -------------------------------------------------------------------------
    // Issue / Verify Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_round_trip_preserves_identity() {
        let tokens = service();
        let token = tokens.issue_at(&subject(), NOW).unwrap();

        let claims = tokens.verify_at(&token, NOW + 10).unwrap();

        assert_eq!(claims.subject(), subject());
        assert_eq!(claims.iat, NOW);
        assert_eq!(claims.exp, NOW + 86_400);
    }

    #[test]
    fn test_round_trip_with_live_clock() {
        let tokens = service();
        let admin = TokenSubject {
            role: Role::Admin,
            ..subject()
        };
        let token = tokens.issue(&admin).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.subject(), admin);
        assert!(claims.has_role(Role::Admin));
    }

    #[test]
    fn test_token_has_three_segments() {
        let token = service().issue_at(&subject(), NOW).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(header_algorithm(&token).as_deref(), Some("HS256"));
    }

    #[test]
    fn test_validity_window_boundaries() {
        let tokens = service();
        let token = tokens.issue_at(&subject(), NOW).unwrap();

        // iat itself is inside the window
        assert!(tokens.verify_at(&token, NOW).is_ok());
        // last second before exp is inside
        assert!(tokens.verify_at(&token, NOW + 86_399).is_ok());
        // exp itself is outside
        assert_eq!(
            tokens.verify_at(&token, NOW + 86_400),
            Err(TokenError::InvalidToken)
        );
        // before iat is outside
        assert_eq!(
            tokens.verify_at(&token, NOW - 1),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service();
        let now = chrono::Utc::now().timestamp();
        let claims = TokenClaims {
            user_id: "u-1".to_string(),
            email: "a@example.com".to_string(),
            name: "A".to_string(),
            role: Role::Student,
            iat: now - 7_200,
            exp: now - 3_600,
        };
        let token = tokens.sign(&claims).unwrap();

        assert_eq!(tokens.verify(&token), Err(TokenError::InvalidToken));
    }

    #[test]
    fn test_tampered_signature_rejected_at_every_position() {
        let tokens = service();
        let token = tokens.issue_at(&subject(), NOW).unwrap();
        let sig_start = token.rfind('.').unwrap() + 1;

        for pos in sig_start..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[pos] = if bytes[pos] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();

            assert_eq!(
                tokens.verify_at(&tampered, NOW + 1),
                Err(TokenError::InvalidToken),
                "flip at position {pos} must be detected"
            );
        }
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let tokens = service();
        let token = tokens.issue_at(&subject(), NOW).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let forged_payload = URL_SAFE_NO_PAD.encode(
            serde_json::json!({
                "user_id": "3f1c2a4e-5b6d-4c7e-8f90-a1b2c3d4e5f6",
                "email": "tenzin@example.com",
                "name": "Tenzin",
                "role": "admin",
                "iat": NOW,
                "exp": NOW + 86_400
            })
            .to_string(),
        );
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(
            tokens.verify_at(&forged, NOW + 1),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let other = TokenService::new(&SecretString::from("other-secret"), DEFAULT_TOKEN_TTL);
        let token = other.issue_at(&subject(), NOW).unwrap();

        assert_eq!(
            service().verify_at(&token, NOW + 1),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn test_other_hmac_algorithm_rejected() {
        let claims = TokenClaims {
            user_id: "u-1".to_string(),
            email: "a@example.com".to_string(),
            name: "A".to_string(),
            role: Role::Admin,
            iat: NOW,
            exp: NOW + 60,
        };
        // Same secret, different algorithm: must not be accepted
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(
            service().verify_at(&token, NOW + 1),
            Err(TokenError::InvalidToken)
        );
        // The rejection log reports the offending algorithm
        assert_eq!(header_algorithm(&token).as_deref(), Some("HS512"));
    }

    #[test]
    fn test_unsigned_token_rejected() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::json!({
                "user_id": "u-1", "email": "a@example.com", "name": "A",
                "role": "admin", "iat": NOW, "exp": NOW + 60
            })
            .to_string(),
        );
        let token = format!("{header}.{payload}.");

        assert_eq!(
            service().verify_at(&token, NOW + 1),
            Err(TokenError::InvalidToken)
        );
        assert_eq!(header_algorithm(&token).as_deref(), Some("none"));
        assert_eq!(header_algorithm("not-base64!.x.y"), None);
    }

    #[test]
    fn test_missing_claim_rejected() {
        #[derive(Serialize)]
        struct Partial {
            user_id: String,
            role: String,
            iat: i64,
            exp: i64,
        }

        let token = encode(
            &Header::new(Algorithm::HS256),
            &Partial {
                user_id: "u-1".to_string(),
                role: "student".to_string(),
                iat: NOW,
                exp: NOW + 60,
            },
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(
            service().verify_at(&token, NOW + 1),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn test_unknown_role_rejected() {
        let token = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({
                "user_id": "u-1", "email": "a@example.com", "name": "A",
                "role": "superuser", "iat": NOW, "exp": NOW + 60
            }),
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(
            service().verify_at(&token, NOW + 1),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let tokens = service();
        for token in ["", "not-a-jwt", "a.b", "a.b.c", "!!!.???.***"] {
            assert_eq!(
                tokens.verify_at(token, NOW),
                Err(TokenError::InvalidToken),
                "{token:?} must be rejected"
            );
        }
    }

    #[test]
    fn test_oversized_token_rejected() {
        let oversized = "a".repeat(MAX_JWT_SIZE_BYTES + 1);
        assert_eq!(
            service().verify_at(&oversized, NOW),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn test_claims_debug_redacts_email() {
        let token = service().issue_at(&subject(), NOW).unwrap();
        let claims = service().verify_at(&token, NOW).unwrap();

        let debug_str = format!("{claims:?}");
        assert!(!debug_str.contains("tenzin@example.com"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_token_service_debug_hides_keys() {
        let debug_str = format!("{:?}", service());
        assert!(!debug_str.contains("test-secret"));
        assert!(debug_str.contains("ttl"));
    }
}
