//! Building, room and bed handlers.
//!
//! - `GET /api/buildings` - All buildings with rooms and beds
//! - `GET /api/buildings/search?q=` - Search by name or description
//! - `GET /api/buildings/{id}` - One building
//! - `GET /api/buildings/{id}/rooms/{roomId}` - One room in a building
//! - `PUT /api/buildings/beds/{bedId}/occupancy` - Reserve or release a bed
//! - `GET /api/buildings/users/{userId}/beds` - Beds held by a user

use crate::errors::BuildingError;
use crate::models::{
    BedsResponse, BuildingResponse, BuildingsResponse, MessageResponse, OccupancyUpdateRequest,
    RoomResponse, SearchQuery,
};
use crate::repositories::{BedsRepository, BuildingsRepository};
use crate::routes::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

#[instrument(skip_all, name = "building.handler.list_buildings")]
pub async fn list_buildings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BuildingsResponse>, BuildingError> {
    let buildings = BuildingsRepository::list_all(&state.pool).await?;
    Ok(Json(BuildingsResponse {
        success: true,
        buildings,
    }))
}

#[instrument(skip_all, name = "building.handler.search_buildings")]
pub async fn search_buildings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<BuildingsResponse>, BuildingError> {
    let buildings = BuildingsRepository::search(&state.pool, query.q.trim()).await?;
    Ok(Json(BuildingsResponse {
        success: true,
        buildings,
    }))
}

#[instrument(skip_all, name = "building.handler.get_building", fields(building_id = %building_id))]
pub async fn get_building(
    State(state): State<Arc<AppState>>,
    Path(building_id): Path<String>,
) -> Result<Json<BuildingResponse>, BuildingError> {
    let building = BuildingsRepository::get_by_id(&state.pool, &building_id)
        .await?
        .ok_or_else(|| BuildingError::NotFound("Building not found".to_string()))?;

    Ok(Json(BuildingResponse {
        success: true,
        building,
    }))
}

#[instrument(skip_all, name = "building.handler.get_room", fields(building_id = %building_id, room_id = %room_id))]
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path((building_id, room_id)): Path<(String, String)>,
) -> Result<Json<RoomResponse>, BuildingError> {
    let room = BuildingsRepository::get_room(&state.pool, &building_id, &room_id)
        .await?
        .ok_or_else(|| BuildingError::NotFound("Room not found".to_string()))?;

    Ok(Json(RoomResponse {
        success: true,
        room,
    }))
}

/// Reserve or release a bed.
///
/// This is the contract the booking service depends on: 200 on success,
/// 404 for an unknown bed, 400 for a malformed body, 500 on store failure.
#[instrument(skip_all, name = "building.handler.update_occupancy", fields(bed_id = %bed_id))]
pub async fn update_bed_occupancy(
    State(state): State<Arc<AppState>>,
    Path(bed_id): Path<String>,
    body: Result<Json<OccupancyUpdateRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, BuildingError> {
    let Json(update) = body.map_err(|e| {
        tracing::debug!(target: "building.handler", error = %e, "Rejected occupancy body");
        BuildingError::BadRequest("Invalid request body".to_string())
    })?;

    BedsRepository::update_occupancy(&state.pool, &bed_id, &update)
        .await?
        .ok_or_else(|| BuildingError::NotFound("Bed not found".to_string()))?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Bed occupancy updated successfully".to_string(),
    }))
}

#[instrument(skip_all, name = "building.handler.beds_for_user", fields(user_id = %user_id))]
pub async fn get_beds_for_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<BedsResponse>, BuildingError> {
    let beds = BedsRepository::list_by_occupant(&state.pool, &user_id).await?;
    Ok(Json(BedsResponse {
        success: true,
        beds,
    }))
}
