//! Booking service business logic.

pub mod bed_inventory;
pub mod booking_service;

pub use bed_inventory::{BedInventory, BuildingServiceClient, OccupancyUpdate};
pub use booking_service::BookingService;
