//! Observability for the booking service.
//!
//! Provides metrics definitions and recording helpers.

pub mod metrics;
