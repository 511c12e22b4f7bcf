//! Booking state machine.
//!
//! ```text
//! none --create--> active --cancel--> cancelled
//! ```
//!
//! Bookings live in the local store; bed occupancy lives in the building
//! service. The two are not transactionally joined, so `create` runs as a
//! two-step saga: insert the booking, then occupy the bed. If the second step
//! fails the booking row is deleted again. `cancel` is the reverse order with
//! no compensation: the cancellation stands even if the bed release fails.

use crate::errors::{
    BookingError, ACTIVE_BOOKING_EXISTS, BED_ALREADY_OCCUPIED, BOOKING_ALREADY_CANCELLED,
    BOOKING_NOT_FOUND,
};
use crate::models::{Booking, BookingFilter, BookingStatus, CreateBookingRequest};
use crate::observability::metrics;
use crate::repositories::BookingRepository;
use crate::services::bed_inventory::{BedInventory, OccupancyUpdate};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Booking lifecycle operations.
#[derive(Clone)]
pub struct BookingService {
    repo: Arc<dyn BookingRepository>,
    inventory: Arc<dyn BedInventory>,
    inventory_timeout: Duration,
}

impl BookingService {
    pub fn new(
        repo: Arc<dyn BookingRepository>,
        inventory: Arc<dyn BedInventory>,
        inventory_timeout: Duration,
    ) -> Self {
        Self {
            repo,
            inventory,
            inventory_timeout,
        }
    }

    /// Reserve a bed for a user.
    ///
    /// # Errors
    ///
    /// - `BadRequest` if `user_id` or `bed_id` is missing
    /// - `Conflict` if the user already holds an active booking or the bed is taken
    /// - `InventoryUnavailable` if the bed could not be marked occupied; the
    ///   booking is rolled back
    #[instrument(skip_all, name = "booking.service.create", fields(user_id = %request.user_id, bed_id = %request.bed_id))]
    pub async fn create(&self, request: CreateBookingRequest) -> Result<Booking, BookingError> {
        let result = self.try_create(request).await;
        metrics::record_booking_operation("create", result.as_ref().err().map(BookingError::kind));
        result
    }

    async fn try_create(&self, request: CreateBookingRequest) -> Result<Booking, BookingError> {
        request.validate()?;

        // Fast path. The partial unique indexes catch whatever races past these.
        if self
            .repo
            .find_active_for_user(&request.user_id)
            .await?
            .is_some()
        {
            return Err(BookingError::Conflict(ACTIVE_BOOKING_EXISTS.to_string()));
        }
        if self
            .repo
            .find_active_for_bed(&request.bed_id)
            .await?
            .is_some()
        {
            return Err(BookingError::Conflict(BED_ALREADY_OCCUPIED.to_string()));
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            user_name: request.user_name,
            building_id: request.building_id,
            building_name: request.building_name,
            room_id: request.room_id,
            room_number: request.room_number,
            bed_id: request.bed_id,
            bed_number: request.bed_number,
            booking_date: now,
            status: BookingStatus::Active,
            created_at: now,
            updated_at: now,
        };

        self.repo.insert(&booking).await?;

        let occupy = OccupancyUpdate::occupy(&booking.user_id, &booking.user_name);
        if let Err(err) = self.update_bed(&booking.bed_id, &occupy).await {
            // Compensate: the bed was never assigned, so the booking must go
            self.roll_back(&booking).await;
            return Err(err);
        }

        info!(
            target: "booking.service",
            booking_id = %booking.id,
            user_id = %booking.user_id,
            bed_id = %booking.bed_id,
            "Booking created"
        );

        Ok(booking)
    }

    /// Cancel an active booking and release its bed.
    ///
    /// A failed bed release is logged and counted but does not fail the
    /// cancellation.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no booking has this id
    /// - `Conflict` if the booking is already cancelled
    #[instrument(skip_all, name = "booking.service.cancel", fields(booking_id = %id))]
    pub async fn cancel(&self, id: Uuid) -> Result<Booking, BookingError> {
        let result = self.try_cancel(id).await;
        metrics::record_booking_operation("cancel", result.as_ref().err().map(BookingError::kind));
        result
    }

    async fn try_cancel(&self, id: Uuid) -> Result<Booking, BookingError> {
        let booking = self.get(id).await?;
        if !booking.is_active() {
            return Err(BookingError::Conflict(BOOKING_ALREADY_CANCELLED.to_string()));
        }

        // None here means a concurrent cancel won the race
        let cancelled = self
            .repo
            .mark_cancelled(id, Utc::now())
            .await?
            .ok_or_else(|| BookingError::Conflict(BOOKING_ALREADY_CANCELLED.to_string()))?;

        if let Err(err) = self
            .update_bed(&cancelled.bed_id, &OccupancyUpdate::release())
            .await
        {
            warn!(
                target: "booking.service",
                booking_id = %cancelled.id,
                bed_id = %cancelled.bed_id,
                error = %err,
                "Bed release failed after cancellation"
            );
            metrics::record_bed_release_failure();
        }

        info!(
            target: "booking.service",
            booking_id = %cancelled.id,
            bed_id = %cancelled.bed_id,
            "Booking cancelled"
        );

        Ok(cancelled)
    }

    /// Fetch one booking.
    ///
    /// # Errors
    ///
    /// `NotFound` if no booking has this id.
    pub async fn get(&self, id: Uuid) -> Result<Booking, BookingError> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(BOOKING_NOT_FOUND.to_string()))
    }

    /// Bookings matching `filter`, newest first.
    pub async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, BookingError> {
        self.repo.list(filter).await
    }

    /// Call the inventory, bounded by the configured timeout.
    async fn update_bed(&self, bed_id: &str, update: &OccupancyUpdate) -> Result<(), BookingError> {
        match tokio::time::timeout(
            self.inventory_timeout,
            self.inventory.update_occupancy(bed_id, update),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    target: "booking.service",
                    bed_id = %bed_id,
                    timeout_ms = u64::try_from(self.inventory_timeout.as_millis()).unwrap_or(u64::MAX),
                    "Bed inventory call timed out"
                );
                Err(BookingError::InventoryUnavailable(
                    "bed inventory call timed out".to_string(),
                ))
            }
        }
    }

    /// Delete a booking whose bed assignment failed.
    async fn roll_back(&self, booking: &Booking) {
        match self.repo.delete(booking.id).await {
            Ok(_) => {
                warn!(
                    target: "booking.service",
                    booking_id = %booking.id,
                    bed_id = %booking.bed_id,
                    "Rolled back booking after bed assignment failure"
                );
                metrics::record_compensating_rollback(true);
            }
            Err(err) => {
                // The row stays active without an occupied bed until repaired
                error!(
                    target: "booking.service",
                    booking_id = %booking.id,
                    bed_id = %booking.bed_id,
                    error = %err,
                    "Compensating delete failed"
                );
                metrics::record_compensating_rollback(false);
            }
        }
    }
}
