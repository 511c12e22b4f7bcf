//! Beds repository.
//!
//! Occupancy updates recompute `available_beds` on the bed's room and
//! building inside the same transaction. The building row is locked first,
//! so updates within one building run one at a time and each recount sees
//! every earlier commit.

use crate::errors::BuildingError;
use crate::models::{Bed, OccupancyUpdateRequest};
use sqlx::PgPool;
use tracing::instrument;

/// Beds repository for database operations.
pub struct BedsRepository;

impl BedsRepository {
    /// Set a bed's occupancy and recompute room and building availability.
    ///
    /// Releasing (`is_occupied = false`) always clears the occupant fields.
    /// Returns `None` if no bed has `bed_id`.
    #[instrument(skip_all, name = "building.repo.update_occupancy", fields(bed_id = %bed_id, is_occupied = update.is_occupied))]
    pub async fn update_occupancy(
        pool: &PgPool,
        bed_id: &str,
        update: &OccupancyUpdateRequest,
    ) -> Result<Option<Bed>, BuildingError> {
        let (occupied_by, occupied_by_name) = if update.is_occupied {
            (update.occupied_by.as_deref(), update.occupied_by_name.as_deref())
        } else {
            (None, None)
        };

        let mut tx = pool.begin().await?;

        // Under READ COMMITTED a recount racing another transaction reads a
        // stale snapshot; holding the building lock until commit prevents it.
        let building_id: Option<String> = sqlx::query_scalar(
            r#"
            SELECT bu.id
            FROM beds b
            JOIN rooms r ON r.id = b.room_id
            JOIN buildings bu ON bu.id = r.building_id
            WHERE b.id = $1
            FOR UPDATE OF bu
            "#,
        )
        .bind(bed_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(building_id) = building_id else {
            tx.rollback().await?;
            return Ok(None);
        };

        let bed = sqlx::query_as::<_, Bed>(
            r#"
            UPDATE beds
            SET is_occupied = $1, occupied_by = $2, occupied_by_name = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING id, room_id, number, is_occupied, occupied_by, occupied_by_name
            "#,
        )
        .bind(update.is_occupied)
        .bind(occupied_by)
        .bind(occupied_by_name)
        .bind(bed_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(bed) = bed else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE rooms
            SET available_beds = (
                    SELECT COUNT(*) FROM beds WHERE room_id = $1 AND is_occupied = FALSE
                ),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(&bed.room_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE buildings
            SET available_beds = (
                    SELECT COUNT(*) FROM beds b
                    JOIN rooms r ON r.id = b.room_id
                    WHERE r.building_id = $1 AND b.is_occupied = FALSE
                ),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(&building_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            target: "building.repo.beds",
            bed_id = %bed.id,
            is_occupied = bed.is_occupied,
            "Bed occupancy updated"
        );

        Ok(Some(bed))
    }

    /// Beds currently held by `user_id`.
    #[instrument(skip_all, name = "building.repo.beds_for_user")]
    pub async fn list_by_occupant(pool: &PgPool, user_id: &str) -> Result<Vec<Bed>, BuildingError> {
        let beds = sqlx::query_as::<_, Bed>(
            r#"
            SELECT id, room_id, number, is_occupied, occupied_by, occupied_by_name
            FROM beds WHERE occupied_by = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(beds)
    }
}
