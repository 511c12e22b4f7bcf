//! HTTP request handlers.

mod bookings;
mod health;
mod metrics;

pub use bookings::{
    cancel_booking, create_booking, get_booking, list_all_bookings, list_user_bookings,
};
pub use health::health_check;
pub use metrics::metrics_handler;
