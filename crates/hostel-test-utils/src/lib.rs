//! # Hostel Test Utilities
//!
//! Shared test utilities for the hostel services.
//!
//! This crate provides:
//! - Server harnesses (`TestAuthServer`, `TestBuildingServer`,
//!   `TestBookingServer`) that run the real routers on random ports
//! - Token builders signed with the shared test secret
//! - Fixed ids for users and seeded beds
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hostel_test_utils::*;
//!
//! #[sqlx::test(migrations = "../../migrations/booking")]
//! async fn test_example(pool: PgPool) -> Result<()> {
//!     let inventory = wiremock::MockServer::start().await;
//!     let server = TestBookingServer::spawn(pool, &inventory.uri()).await?;
//!
//!     let response = reqwest::Client::new()
//!         .get(format!("{}/api/bookings/users/{STUDENT_A}", server.url()))
//!         .bearer_auth(student_token(STUDENT_A))
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod fixtures;
pub mod server_harness;
pub mod tokens;

// Re-export commonly used items
pub use fixtures::*;
pub use server_harness::*;
pub use tokens::*;
