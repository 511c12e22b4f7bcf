//! Fixed ids used across tests.
//!
//! Bed ids follow the building service seed layout:
//! `{building}-room-{NNN}-bed-{n}`. Room 001 of every seeded building is a
//! double and room 002 a triple.

/// Student user ids.
pub const STUDENT_A: &str = "student-a";
pub const STUDENT_B: &str = "student-b";

/// Admin user id.
pub const ADMIN: &str = "admin-1";

/// First seeded building.
pub const BUILDING_1: &str = "bldg-1";

/// Name of the first seeded building.
pub const BUILDING_1_NAME: &str = "RK A";

/// First room of the first seeded building (a double).
pub const ROOM_1: &str = "bldg-1-room-001";

/// Second room of the first seeded building (a triple).
pub const ROOM_2: &str = "bldg-1-room-002";

/// Beds in `ROOM_1`.
pub const BED_1: &str = "bldg-1-room-001-bed-1";
pub const BED_2: &str = "bldg-1-room-001-bed-2";

/// First bed in `ROOM_2`.
pub const BED_3: &str = "bldg-1-room-002-bed-1";

/// Booking request body for `user_id` reserving `bed_id`.
pub fn booking_body(user_id: &str, bed_id: &str) -> serde_json::Value {
    let (room_id, room_number) = if bed_id.starts_with(ROOM_2) {
        (ROOM_2, "002")
    } else {
        (ROOM_1, "001")
    };
    let bed_number: i32 = bed_id
        .rsplit('-')
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(1);

    serde_json::json!({
        "user_id": user_id,
        "user_name": format!("{user_id} name"),
        "building_id": BUILDING_1,
        "building_name": BUILDING_1_NAME,
        "room_id": room_id,
        "room_number": room_number,
        "bed_id": bed_id,
        "bed_number": bed_number,
    })
}
