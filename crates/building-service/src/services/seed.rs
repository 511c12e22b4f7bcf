//! Sample inventory loaded into an empty database.
//!
//! Ten buildings. Room types cycle single/double/triple/quad on `i % 4` of
//! the 1-based room index, so room 001 is a double and room 004 a single.
//! Room ids are `{building}-room-{NNN}` and bed ids `{room}-bed-{n}`.

use crate::errors::BuildingError;
use crate::repositories::BuildingsRepository;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::instrument;

/// Price applied to every seeded room.
pub const SEED_ROOM_PRICE: f64 = 5000.00;

/// Image path applied to every seeded building.
pub const SEED_IMAGE: &str = "/placeholder.svg";

/// Room type and bed count for the room at 1-based `index`.
fn room_type_for(index: u32) -> (&'static str, i32) {
    match index % 4 {
        0 => ("single", 1),
        1 => ("double", 2),
        2 => ("triple", 3),
        _ => ("quad", 4),
    }
}

/// A building in the sample data set.
#[derive(Debug, Clone, Copy)]
pub struct SeedBuilding {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub amenities: &'static [&'static str],
    pub room_count: u32,
}

pub const SEED_BUILDINGS: [SeedBuilding; 10] = [
    SeedBuilding {
        id: "bldg-1",
        name: "RK A",
        description: "Modern residence with state-of-the-art facilities",
        amenities: &["Wi-Fi", "Laundry Room", "Common Kitchen", "Study Lounge", "Recreation Room"],
        room_count: 25,
    },
    SeedBuilding {
        id: "bldg-2",
        name: "RK B",
        description: "Cozy accommodation with a homely atmosphere",
        amenities: &["Wi-Fi", "Laundry Room", "Study Lounge", "Gym"],
        room_count: 20,
    },
    SeedBuilding {
        id: "bldg-3",
        name: "H A",
        description: "Spacious rooms with excellent natural lighting",
        amenities: &["Wi-Fi", "Laundry Room", "Common Kitchen", "Cafeteria"],
        room_count: 30,
    },
    SeedBuilding {
        id: "bldg-4",
        name: "H B",
        description: "Contemporary design with eco-friendly features",
        amenities: &["Wi-Fi", "Study Lounge", "Recreation Room", "Parking"],
        room_count: 22,
    },
    SeedBuilding {
        id: "bldg-5",
        name: "H C",
        description: "Traditional architecture with modern amenities",
        amenities: &["Wi-Fi", "Laundry Room", "Gym", "Library"],
        room_count: 18,
    },
    SeedBuilding {
        id: "bldg-6",
        name: "H D",
        description: "Quiet location perfect for studying",
        amenities: &["Wi-Fi", "Common Kitchen", "Study Lounge"],
        room_count: 15,
    },
    SeedBuilding {
        id: "bldg-7",
        name: "H E",
        description: "Central location with easy campus access",
        amenities: &["Wi-Fi", "Laundry Room", "Recreation Room", "Parking"],
        room_count: 28,
    },
    SeedBuilding {
        id: "bldg-8",
        name: "H F",
        description: "Newly renovated with premium facilities",
        amenities: &["Wi-Fi", "Gym", "Cafeteria", "Library"],
        room_count: 24,
    },
    SeedBuilding {
        id: "bldg-9",
        name: "NK",
        description: "Garden view rooms with peaceful surroundings",
        amenities: &["Wi-Fi", "Laundry Room", "Common Kitchen", "Study Lounge"],
        room_count: 20,
    },
    SeedBuilding {
        id: "bldg-10",
        name: "Lhawang",
        description: "High-rise building with panoramic views",
        amenities: &["Wi-Fi", "Recreation Room", "Gym", "Parking", "Cafeteria"],
        room_count: 35,
    },
];

/// A room derived from its building and 1-based index.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedRoom {
    pub id: String,
    pub number: String,
    pub room_type: &'static str,
    pub beds: i32,
    pub amenities: Vec<String>,
}

/// Rooms for `building`, in order.
pub fn rooms_for(building: &SeedBuilding) -> Vec<SeedRoom> {
    (1..=building.room_count)
        .map(|i| {
            let (room_type, beds) = room_type_for(i);
            let number = format!("{i:03}");
            let bathroom = if room_type == "single" {
                "Private Bathroom"
            } else {
                "Shared Bathroom"
            };
            SeedRoom {
                id: format!("{}-room-{number}", building.id),
                number,
                room_type,
                beds,
                amenities: ["Wi-Fi", "Study Desk", "Wardrobe", bathroom]
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            }
        })
        .collect()
}

/// Insert the sample data if the buildings table is empty.
///
/// Returns the number of buildings inserted (0 when already seeded). All
/// inserts run in a single transaction.
#[instrument(skip_all, name = "building.seed")]
pub async fn seed_if_empty(pool: &PgPool) -> Result<usize, BuildingError> {
    if BuildingsRepository::count(pool).await? > 0 {
        tracing::info!(target: "building.seed", "Database already seeded");
        return Ok(0);
    }

    let mut tx = pool.begin().await?;

    for building in &SEED_BUILDINGS {
        let rooms = rooms_for(building);
        let total_beds: i32 = rooms.iter().map(|r| r.beds).sum();
        let amenities: Vec<String> = building.amenities.iter().map(ToString::to_string).collect();

        sqlx::query(
            r#"
            INSERT INTO buildings (id, name, description, total_rooms, total_beds,
                                   available_beds, amenities, image)
            VALUES ($1, $2, $3, $4, $5, $5, $6, $7)
            "#,
        )
        .bind(building.id)
        .bind(building.name)
        .bind(building.description)
        .bind(i32::try_from(rooms.len()).unwrap_or(i32::MAX))
        .bind(total_beds)
        .bind(Json(&amenities))
        .bind(SEED_IMAGE)
        .execute(&mut *tx)
        .await?;

        for room in &rooms {
            sqlx::query(
                r#"
                INSERT INTO rooms (id, building_id, number, type, total_beds,
                                   available_beds, amenities, price)
                VALUES ($1, $2, $3, $4, $5, $5, $6, $7)
                "#,
            )
            .bind(&room.id)
            .bind(building.id)
            .bind(&room.number)
            .bind(room.room_type)
            .bind(room.beds)
            .bind(Json(&room.amenities))
            .bind(SEED_ROOM_PRICE)
            .execute(&mut *tx)
            .await?;

            for n in 1..=room.beds {
                sqlx::query(
                    "INSERT INTO beds (id, room_id, number, is_occupied) VALUES ($1, $2, $3, FALSE)",
                )
                .bind(format!("{}-bed-{n}", room.id))
                .bind(&room.id)
                .bind(n)
                .execute(&mut *tx)
                .await?;
            }
        }
    }

    tx.commit().await?;

    tracing::info!(
        target: "building.seed",
        buildings = SEED_BUILDINGS.len(),
        "Database seeded with sample data"
    );

    Ok(SEED_BUILDINGS.len())
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_room_types_cycle_from_index_one() {
        let rooms = rooms_for(&SEED_BUILDINGS[0]);
        assert_eq!(rooms.len(), 25);

        assert_eq!(rooms[0].id, "bldg-1-room-001");
        assert_eq!(rooms[0].room_type, "double");
        assert_eq!(rooms[1].room_type, "triple");
        assert_eq!(rooms[2].room_type, "quad");
        assert_eq!(rooms[3].room_type, "single");
        assert_eq!(rooms[3].beds, 1);
        assert!(rooms[3].amenities.contains(&"Private Bathroom".to_string()));
        assert!(rooms[0].amenities.contains(&"Shared Bathroom".to_string()));
    }

    #[test]
    fn test_seed_set_shape() {
        let ids: Vec<&str> = SEED_BUILDINGS.iter().map(|b| b.id).collect();
        assert_eq!(ids.first(), Some(&"bldg-1"));
        assert_eq!(ids.last(), Some(&"bldg-10"));

        let counts: Vec<u32> = SEED_BUILDINGS.iter().map(|b| b.room_count).collect();
        assert_eq!(counts, vec![25, 20, 30, 22, 18, 15, 28, 24, 20, 35]);
    }

    #[test]
    fn test_room_numbers_are_zero_padded() {
        let rooms = rooms_for(&SEED_BUILDINGS[9]);
        assert_eq!(rooms.last().map(|r| r.id.as_str()), Some("bldg-10-room-035"));
        assert_eq!(rooms[9].number, "010");
    }
}
