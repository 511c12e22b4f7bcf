//! Secret types for values that must never reach a log line.
//!
//! Re-exports [`secrecy`]. Passwords from signup/login bodies, the token
//! signing secret, and database URLs are all held as [`SecretString`]: its
//! `Debug` impl prints `[REDACTED]`, so structs that derive `Debug` stay safe
//! to trace, and the value is zeroized on drop.
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct LoginRequest {
//!     email: String,
//!     password: SecretString,
//! }
//!
//! let req: LoginRequest =
//!     serde_json::from_str(r#"{"email": "dolma@example.com", "password": "hunter22"}"#).unwrap();
//!
//! assert!(!format!("{req:?}").contains("hunter22"));
//! assert_eq!(req.password.expose_secret(), "hunter22");
//! ```

pub use secrecy::{ExposeSecret, SecretString};
