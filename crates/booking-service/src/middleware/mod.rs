//! HTTP middleware for the booking service.
//!
//! Authentication lives in `common::auth`; this module only carries the
//! metrics layer.

pub mod http_metrics;

pub use http_metrics::http_metrics_middleware;
