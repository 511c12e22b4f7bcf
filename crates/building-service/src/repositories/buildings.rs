//! Buildings repository.
//!
//! Reads return fully assembled `BuildingWithRooms` trees. Rooms and beds
//! are loaded with one query per level (`= ANY($1)`) and grouped in memory.

use crate::errors::BuildingError;
use crate::models::{Bed, BuildingRow, BuildingWithRooms, RoomRow, RoomWithBeds};
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::instrument;

const BUILDING_COLUMNS: &str = r#"
    id, name, description, total_rooms, total_beds, available_beds,
    amenities, image, created_at, updated_at
"#;

const ROOM_COLUMNS: &str = r#"
    id, building_id, number, type, total_beds, available_beds,
    amenities, price, created_at, updated_at
"#;

/// Buildings repository for database operations.
pub struct BuildingsRepository;

impl BuildingsRepository {
    /// All buildings ordered by name.
    #[instrument(skip_all, name = "building.repo.list_buildings")]
    pub async fn list_all(pool: &PgPool) -> Result<Vec<BuildingWithRooms>, BuildingError> {
        let rows = sqlx::query_as::<_, BuildingRow>(&format!(
            "SELECT {BUILDING_COLUMNS} FROM buildings ORDER BY name"
        ))
        .fetch_all(pool)
        .await?;

        Self::assemble(pool, rows).await
    }

    /// Buildings whose name or description contains `query`, case-insensitively.
    ///
    /// LIKE metacharacters in `query` are matched literally.
    #[instrument(skip_all, name = "building.repo.search_buildings")]
    pub async fn search(pool: &PgPool, query: &str) -> Result<Vec<BuildingWithRooms>, BuildingError> {
        let pattern = format!("%{}%", escape_like(query));

        let rows = sqlx::query_as::<_, BuildingRow>(&format!(
            r#"
            SELECT {BUILDING_COLUMNS} FROM buildings
            WHERE name ILIKE $1 ESCAPE '\' OR description ILIKE $1 ESCAPE '\'
            ORDER BY name
            "#
        ))
        .bind(pattern)
        .fetch_all(pool)
        .await?;

        Self::assemble(pool, rows).await
    }

    /// One building with its rooms and beds.
    #[instrument(skip_all, name = "building.repo.get_building", fields(building_id = %building_id))]
    pub async fn get_by_id(
        pool: &PgPool,
        building_id: &str,
    ) -> Result<Option<BuildingWithRooms>, BuildingError> {
        let row = sqlx::query_as::<_, BuildingRow>(&format!(
            "SELECT {BUILDING_COLUMNS} FROM buildings WHERE id = $1"
        ))
        .bind(building_id)
        .fetch_optional(pool)
        .await?;

        match row {
            Some(row) => Ok(Self::assemble(pool, vec![row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    /// One room with its beds, only if it belongs to `building_id`.
    #[instrument(skip_all, name = "building.repo.get_room", fields(building_id = %building_id, room_id = %room_id))]
    pub async fn get_room(
        pool: &PgPool,
        building_id: &str,
        room_id: &str,
    ) -> Result<Option<RoomWithBeds>, BuildingError> {
        let row = sqlx::query_as::<_, RoomRow>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE id = $1 AND building_id = $2"
        ))
        .bind(room_id)
        .bind(building_id)
        .fetch_optional(pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let beds = sqlx::query_as::<_, Bed>(
            r#"
            SELECT id, room_id, number, is_occupied, occupied_by, occupied_by_name
            FROM beds WHERE room_id = $1 ORDER BY number
            "#,
        )
        .bind(&row.id)
        .fetch_all(pool)
        .await?;

        Ok(Some(RoomWithBeds::from_row(row, beds)))
    }

    /// Number of buildings.
    pub async fn count(pool: &PgPool) -> Result<i64, BuildingError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM buildings")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Attach rooms and beds to building rows, preserving row order.
    async fn assemble(
        pool: &PgPool,
        buildings: Vec<BuildingRow>,
    ) -> Result<Vec<BuildingWithRooms>, BuildingError> {
        if buildings.is_empty() {
            return Ok(Vec::new());
        }

        let building_ids: Vec<String> = buildings.iter().map(|b| b.id.clone()).collect();
        let rooms = sqlx::query_as::<_, RoomRow>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE building_id = ANY($1) ORDER BY number"
        ))
        .bind(&building_ids)
        .fetch_all(pool)
        .await?;

        let room_ids: Vec<String> = rooms.iter().map(|r| r.id.clone()).collect();
        let beds = sqlx::query_as::<_, Bed>(
            r#"
            SELECT id, room_id, number, is_occupied, occupied_by, occupied_by_name
            FROM beds WHERE room_id = ANY($1) ORDER BY number
            "#,
        )
        .bind(&room_ids)
        .fetch_all(pool)
        .await?;

        let mut beds_by_room: HashMap<String, Vec<Bed>> = HashMap::new();
        for bed in beds {
            beds_by_room.entry(bed.room_id.clone()).or_default().push(bed);
        }

        let mut rooms_by_building: HashMap<String, Vec<RoomWithBeds>> = HashMap::new();
        for room in rooms {
            let beds = beds_by_room.remove(&room.id).unwrap_or_default();
            rooms_by_building
                .entry(room.building_id.clone())
                .or_default()
                .push(RoomWithBeds::from_row(room, beds));
        }

        Ok(buildings
            .into_iter()
            .map(|row| {
                let rooms = rooms_by_building.remove(&row.id).unwrap_or_default();
                BuildingWithRooms::from_row(row, rooms)
            })
            .collect())
    }
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
