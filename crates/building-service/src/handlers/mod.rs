//! HTTP request handlers.

mod buildings;
mod health;

pub use buildings::{
    get_beds_for_user, get_building, get_room, list_buildings, search_buildings,
    update_bed_occupancy,
};
pub use health::health_check;
