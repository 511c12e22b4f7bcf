//! Building Service Library
//!
//! Owns the hostel inventory: buildings, rooms and beds. Bed occupancy
//! stored here is the single source of truth for availability; the booking
//! service reserves and releases beds through the occupancy endpoint.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `models` - Data models
//! - `repositories` - Database access layer
//! - `routes` - Router and application state
//! - `services` - Seed data

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

/// Embedded schema for the building database.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/building");
