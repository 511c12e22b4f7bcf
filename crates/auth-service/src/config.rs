//! Auth service configuration.
//!
//! Configuration is loaded from environment variables. The database URL and
//! token secret are redacted in Debug output.

use common::config::{
    bind_address_from_vars, parse_var, required_secret, ConfigError, DatabaseConfig,
};
use common::jwt::token_ttl_from_env_value;
use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8001;

/// Default database name when `DB_NAME` is unset.
pub const DEFAULT_DB_NAME: &str = "auth_db";

/// Default bcrypt cost factor.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Minimum allowed bcrypt cost.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Maximum allowed bcrypt cost.
pub const MAX_BCRYPT_COST: u32 = 14;

#[derive(Clone)]
pub struct Config {
    /// Database connection settings.
    pub database: DatabaseConfig,

    /// Server bind address (default: "0.0.0.0:8001").
    pub bind_address: String,

    /// Token signing secret.
    pub jwt_secret: SecretString,

    /// Lifetime of issued tokens, from `JWT_EXPIRY` (default: 24h).
    pub token_ttl: Duration,

    /// Bcrypt cost factor for password hashes (default: 12, range 10-14).
    pub bcrypt_cost: u32,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database", &self.database)
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bcrypt_cost: u32 = parse_var(vars, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                name: "BCRYPT_COST".to_string(),
                reason: format!(
                    "must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}, got {bcrypt_cost}"
                ),
            });
        }

        Ok(Config {
            database: DatabaseConfig::from_vars(vars, DEFAULT_DB_NAME)?,
            bind_address: bind_address_from_vars(vars, DEFAULT_PORT)?,
            jwt_secret: required_secret(vars, "JWT_SECRET")?,
            // Unusable values fall back to the default without error
            token_ttl: token_ttl_from_env_value(vars.get("JWT_EXPIRY").map(String::as_str)),
            bcrypt_cost,
        })
    }
}
