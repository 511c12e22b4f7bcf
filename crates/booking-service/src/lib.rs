//! Booking Service Library
//!
//! Owns the booking lifecycle (`none -> active -> cancelled`) and keeps it
//! consistent with bed occupancy held by the building service.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - HTTP metrics middleware
//! - `models` - Data models
//! - `observability` - Prometheus metrics
//! - `repositories` - Booking store (PostgreSQL and in-memory)
//! - `routes` - Router and application state
//! - `services` - Booking state machine and bed inventory client

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;

/// Embedded schema for the booking database.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/booking");
