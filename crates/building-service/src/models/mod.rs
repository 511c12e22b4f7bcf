//! Data models for the building service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Building row.
#[derive(Debug, Clone, FromRow)]
pub struct BuildingRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub total_rooms: i32,
    pub total_beds: i32,
    pub available_beds: i32,
    pub amenities: Json<Vec<String>>,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Room row.
#[derive(Debug, Clone, FromRow)]
pub struct RoomRow {
    pub id: String,
    pub building_id: String,
    pub number: String,
    #[sqlx(rename = "type")]
    pub room_type: String,
    pub total_beds: i32,
    pub available_beds: i32,
    pub amenities: Json<Vec<String>>,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single bed. `is_occupied` is authoritative for availability.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Bed {
    pub id: String,
    pub room_id: String,
    pub number: i32,
    pub is_occupied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupied_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupied_by_name: Option<String>,
}

/// Room with its beds, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomWithBeds {
    pub id: String,
    pub building_id: String,
    pub number: String,
    #[serde(rename = "type")]
    pub room_type: String,
    pub total_beds: i32,
    pub available_beds: i32,
    pub amenities: Vec<String>,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub beds: Vec<Bed>,
}

impl RoomWithBeds {
    pub fn from_row(row: RoomRow, beds: Vec<Bed>) -> Self {
        Self {
            id: row.id,
            building_id: row.building_id,
            number: row.number,
            room_type: row.room_type,
            total_beds: row.total_beds,
            available_beds: row.available_beds,
            amenities: row.amenities.0,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
            beds,
        }
    }
}

/// Building with its rooms and beds, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingWithRooms {
    pub id: String,
    pub name: String,
    pub description: String,
    pub total_rooms: i32,
    pub total_beds: i32,
    pub available_beds: i32,
    pub amenities: Vec<String>,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub rooms: Vec<RoomWithBeds>,
}

impl BuildingWithRooms {
    pub fn from_row(row: BuildingRow, rooms: Vec<RoomWithBeds>) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            total_rooms: row.total_rooms,
            total_beds: row.total_beds,
            available_beds: row.available_beds,
            amenities: row.amenities.0,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
            rooms,
        }
    }
}

/// Body of `PUT /api/buildings/beds/{bedId}/occupancy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyUpdateRequest {
    pub is_occupied: bool,
    #[serde(default)]
    pub occupied_by: Option<String>,
    #[serde(default)]
    pub occupied_by_name: Option<String>,
}

/// Query string for `GET /api/buildings/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BuildingsResponse {
    pub success: bool,
    pub buildings: Vec<BuildingWithRooms>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BuildingResponse {
    pub success: bool,
    pub building: BuildingWithRooms,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoomResponse {
    pub success: bool,
    pub room: RoomWithBeds,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BedsResponse {
    pub success: bool,
    pub beds: Vec<Bed>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_free_bed_omits_occupant_fields() {
        let bed = Bed {
            id: "bldg-1-room-001-bed-1".to_string(),
            room_id: "bldg-1-room-001".to_string(),
            number: 1,
            is_occupied: false,
            occupied_by: None,
            occupied_by_name: None,
        };
        let json = serde_json::to_value(&bed).unwrap();
        assert!(json.get("occupied_by").is_none());
        assert!(json.get("occupied_by_name").is_none());
        assert_eq!(json["is_occupied"], false);
    }

    #[test]
    fn test_release_body_accepts_nulls() {
        let req: OccupancyUpdateRequest = serde_json::from_str(
            r#"{"is_occupied": false, "occupied_by": null, "occupied_by_name": null}"#,
        )
        .unwrap();
        assert!(!req.is_occupied);
        assert!(req.occupied_by.is_none());

        let req: OccupancyUpdateRequest = serde_json::from_str(r#"{"is_occupied": false}"#).unwrap();
        assert!(req.occupied_by_name.is_none());
    }

    #[test]
    fn test_occupancy_body_requires_flag() {
        let result = serde_json::from_str::<OccupancyUpdateRequest>(r#"{"occupied_by": "u-1"}"#);
        assert!(result.is_err());
    }
}
