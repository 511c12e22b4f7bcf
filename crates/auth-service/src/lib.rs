//! Auth Service Library
//!
//! User accounts and token issuance for the hostel backend. Tokens issued here
//! are verified by every other service with the shared secret.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `models` - Data models
//! - `repositories` - User store
//! - `routes` - Router and application state
//! - `services` - Signup, login and password hashing

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

/// Embedded schema for the auth database.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/auth");
