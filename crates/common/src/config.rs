//! Configuration shared by every hostel service.
//!
//! Each service owns a `Config` loaded via `from_env()` / `from_vars()`; the
//! pieces they have in common (database connection, bind address) live here.
//! Connection strings are held as [`SecretString`] because they embed the
//! database password.

use crate::secret::{ExposeSecret, SecretString};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Server-side statement timeout applied to every pooled connection.
pub const DEFAULT_QUERY_TIMEOUT_SECONDS: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

/// Database connection settings.
#[derive(Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: SecretString,

    /// Maximum number of pooled connections.
    pub max_connections: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl DatabaseConfig {
    /// Resolve database settings from environment variables.
    ///
    /// `DATABASE_URL` wins when present. Otherwise the URL is composed from
    /// `DB_HOST` (localhost), `DB_PORT` (5432), `DB_USER` (postgres),
    /// `DB_PASSWORD` (postgres) and `DB_NAME` (`default_db_name`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `DB_PORT` or
    /// `DB_MAX_CONNECTIONS` is not a positive integer.
    pub fn from_vars(
        vars: &HashMap<String, String>,
        default_db_name: &str,
    ) -> Result<Self, ConfigError> {
        let url = if let Some(url) = vars.get("DATABASE_URL") {
            url.clone()
        } else {
            let host = var_or(vars, "DB_HOST", "localhost");
            let port: u16 = parse_var(vars, "DB_PORT", 5432)?;
            let user = var_or(vars, "DB_USER", "postgres");
            let password = var_or(vars, "DB_PASSWORD", "postgres");
            let name = var_or(vars, "DB_NAME", default_db_name);
            format!("postgres://{user}:{password}@{host}:{port}/{name}?sslmode=disable")
        };

        let max_connections: u32 = parse_var(vars, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                name: "DB_MAX_CONNECTIONS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            url: SecretString::from(url),
            max_connections,
        })
    }

    /// Open a connection pool with a server-side statement timeout.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the initial connection fails.
    pub async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        let url = add_query_timeout(self.url.expose_secret(), DEFAULT_QUERY_TIMEOUT_SECONDS);
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(&url)
            .await
    }
}

/// Resolve the listen address.
///
/// `BIND_ADDRESS` wins; otherwise `0.0.0.0:{PORT}`, with `default_port` when
/// `PORT` is unset.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if `PORT` is not a valid port number.
pub fn bind_address_from_vars(
    vars: &HashMap<String, String>,
    default_port: u16,
) -> Result<String, ConfigError> {
    if let Some(address) = vars.get("BIND_ADDRESS") {
        return Ok(address.clone());
    }
    let port: u16 = parse_var(vars, "PORT", default_port)?;
    Ok(format!("0.0.0.0:{port}"))
}

/// Read a required secret variable.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if the variable is absent or empty.
pub fn required_secret(
    vars: &HashMap<String, String>,
    name: &str,
) -> Result<SecretString, ConfigError> {
    match vars.get(name) {
        Some(value) if !value.is_empty() => Ok(SecretString::from(value.clone())),
        _ => Err(ConfigError::MissingEnvVar(name.to_string())),
    }
}

/// Parse an optional variable, falling back to `default` when unset.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if the variable is set but unparseable.
pub fn parse_var<T>(vars: &HashMap<String, String>, name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match vars.get(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn var_or(vars: &HashMap<String, String>, name: &str, default: &str) -> String {
    vars.get(name)
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

/// Adds `statement_timeout` to the database URL.
fn add_query_timeout(url: &str, timeout_secs: u32) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}options=-c%20statement_timeout%3D{timeout_secs}s")
}
