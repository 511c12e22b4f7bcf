//! Business logic for the building service.

pub mod seed;
