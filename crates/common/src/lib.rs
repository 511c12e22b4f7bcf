//! Common utilities and types shared across the hostel services.

#![warn(clippy::pedantic)]

/// Module for request guards (bearer token and role checks)
pub mod auth;

/// Module for shared service configuration
pub mod config;

/// Module for the JSON error body returned by every service
pub mod error;

/// Module for token issuance and verification
pub mod jwt;

/// Module for the graceful shutdown signal
pub mod shutdown;

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for common data types
pub mod types;
