//! Booking service configuration.
//!
//! Configuration is loaded from environment variables. The database URL and
//! token secret are redacted in Debug output.

use common::config::{
    bind_address_from_vars, parse_var, required_secret, ConfigError, DatabaseConfig,
};
use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8003;

/// Default database name when `DB_NAME` is unset.
pub const DEFAULT_DB_NAME: &str = "booking_db";

/// Default building service base URL.
pub const DEFAULT_BUILDING_SERVICE_URL: &str = "http://localhost:8002";

/// Default bound on a single bed inventory call, in seconds.
pub const DEFAULT_INVENTORY_TIMEOUT_SECONDS: u64 = 10;

/// Minimum allowed inventory timeout in seconds.
pub const MIN_INVENTORY_TIMEOUT_SECONDS: u64 = 1;

/// Maximum allowed inventory timeout in seconds.
pub const MAX_INVENTORY_TIMEOUT_SECONDS: u64 = 60;

#[derive(Clone)]
pub struct Config {
    /// Database connection settings.
    pub database: DatabaseConfig,

    /// Server bind address (default: "0.0.0.0:8003").
    pub bind_address: String,

    /// Token signing secret shared with the auth service.
    pub jwt_secret: SecretString,

    /// Base URL of the building service.
    pub building_service_url: String,

    /// Bound on each bed inventory call.
    pub inventory_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database", &self.database)
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field("building_service_url", &self.building_service_url)
            .field("inventory_timeout", &self.inventory_timeout)
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
        let database = DatabaseConfig::from_vars(vars, DEFAULT_DB_NAME)?;
        let bind_address = bind_address_from_vars(vars, DEFAULT_PORT)?;
        let jwt_secret = required_secret(vars, "JWT_SECRET")?;

        let building_service_url = vars
            .get("BUILDING_SERVICE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BUILDING_SERVICE_URL.to_string());

        let timeout_secs: u64 = parse_var(
            vars,
            "INVENTORY_TIMEOUT_SECONDS",
            DEFAULT_INVENTORY_TIMEOUT_SECONDS,
        )?;
        if !(MIN_INVENTORY_TIMEOUT_SECONDS..=MAX_INVENTORY_TIMEOUT_SECONDS).contains(&timeout_secs)
        {
            return Err(ConfigError::InvalidValue {
                name: "INVENTORY_TIMEOUT_SECONDS".to_string(),
                reason: format!(
                    "must be between {MIN_INVENTORY_TIMEOUT_SECONDS} and {MAX_INVENTORY_TIMEOUT_SECONDS}, got {timeout_secs}"
                ),
            });
        }

        Ok(Config {
            database,
            bind_address,
            jwt_secret,
            building_service_url,
            inventory_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use common::secret::ExposeSecret;

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([("JWT_SECRET".to_string(), "test-secret".to_string())])
    }

    #[test]
    fn test_from_vars_defaults() {
        let config = Config::from_vars(&base_vars()).expect("Config should load successfully");

        assert_eq!(config.bind_address, "0.0.0.0:8003");
        assert_eq!(config.building_service_url, "http://localhost:8002");
        assert_eq!(config.inventory_timeout, Duration::from_secs(10));
        assert_eq!(config.jwt_secret.expose_secret(), "test-secret");
    }

    #[test]
    fn test_from_vars_missing_jwt_secret() {
        let result = Config::from_vars(&HashMap::new());
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "JWT_SECRET"));
    }

    #[test]
    fn test_building_service_url_trailing_slash_trimmed() {
        let mut vars = base_vars();
        vars.insert(
            "BUILDING_SERVICE_URL".to_string(),
            "http://building-service:8002/".to_string(),
        );
        let config = Config::from_vars(&vars).unwrap();
        assert_eq!(config.building_service_url, "http://building-service:8002");
    }

    #[test]
    fn test_inventory_timeout_bounds() {
        for (raw, ok) in [("1", true), ("60", true), ("0", false), ("61", false), ("ten", false)] {
            let mut vars = base_vars();
            vars.insert("INVENTORY_TIMEOUT_SECONDS".to_string(), raw.to_string());
            assert_eq!(Config::from_vars(&vars).is_ok(), ok, "value {raw}");
        }
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut vars = base_vars();
        vars.insert(
            "DATABASE_URL".to_string(),
            "postgres://u:dbpass@db/booking".to_string(),
        );
        let config = Config::from_vars(&vars).unwrap();
        let debug_str = format!("{config:?}");
        assert!(!debug_str.contains("test-secret"));
        assert!(!debug_str.contains("dbpass"));
    }
}
