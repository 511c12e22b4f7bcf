//! Booking store.

mod bookings;

pub use bookings::{mock, BookingRepository, PgBookingRepository};
