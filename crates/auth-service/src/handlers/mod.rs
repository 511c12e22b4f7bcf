//! HTTP request handlers.

mod auth;
mod health;

pub use auth::{login, profile, signup, validate};
pub use health::health_check;
