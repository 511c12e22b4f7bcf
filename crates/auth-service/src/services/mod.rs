//! Auth service business logic.

pub mod password;
pub mod user_service;
