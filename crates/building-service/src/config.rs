//! Building service configuration.
//!
//! Loaded from environment variables. The database URL is redacted in
//! Debug output.

use common::config::{bind_address_from_vars, parse_var, ConfigError, DatabaseConfig};
use std::collections::HashMap;
use std::env;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8002;

/// Default database name when `DB_NAME` is unset.
pub const DEFAULT_DB_NAME: &str = "building_db";

#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection settings.
    pub database: DatabaseConfig,

    /// Server bind address (default: "0.0.0.0:8002").
    pub bind_address: String,

    /// Seed the sample buildings when the table is empty (default: true).
    pub seed_data: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Ok(Config {
            database: DatabaseConfig::from_vars(vars, DEFAULT_DB_NAME)?,
            bind_address: bind_address_from_vars(vars, DEFAULT_PORT)?,
            seed_data: parse_var(vars, "SEED_DATA", true)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(&HashMap::new()).expect("defaults should load");
        assert_eq!(config.bind_address, "0.0.0.0:8002");
        assert!(config.seed_data);
    }

    #[test]
    fn test_seed_data_can_be_disabled() {
        let vars = HashMap::from([("SEED_DATA".to_string(), "false".to_string())]);
        let config = Config::from_vars(&vars).unwrap();
        assert!(!config.seed_data);
    }

    #[test]
    fn test_invalid_seed_flag() {
        let vars = HashMap::from([("SEED_DATA".to_string(), "maybe".to_string())]);
        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::InvalidValue { name, .. }) if name == "SEED_DATA"));
    }
}
