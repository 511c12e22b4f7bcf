//! Bookings repository.
//!
//! The partial unique indexes `bookings_one_active_per_user` and
//! `bookings_one_active_per_bed` are the source of truth for the booking
//! invariants. `insert` maps their violations to the same conflict errors the
//! state machine's fast-path checks produce.

use crate::errors::{BookingError, ACTIVE_BOOKING_EXISTS, BED_ALREADY_OCCUPIED};
use crate::models::{Booking, BookingFilter, BookingRow, BookingStatus};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

/// Unique index guarding one active booking per user.
pub const ACTIVE_PER_USER_INDEX: &str = "bookings_one_active_per_user";

/// Unique index guarding one active booking per bed.
pub const ACTIVE_PER_BED_INDEX: &str = "bookings_one_active_per_bed";

const BOOKING_COLUMNS: &str = r#"
    id, user_id, user_name, building_id, building_name, room_id, room_number,
    bed_id, bed_number, booking_date, status, created_at, updated_at
"#;

/// Persistence for bookings.
#[async_trait::async_trait]
pub trait BookingRepository: Send + Sync {
    /// The user's active booking, if any.
    async fn find_active_for_user(&self, user_id: &str) -> Result<Option<Booking>, BookingError>;

    /// The active booking holding `bed_id`, if any.
    async fn find_active_for_bed(&self, bed_id: &str) -> Result<Option<Booking>, BookingError>;

    /// Insert a new booking.
    ///
    /// Returns `BookingError::Conflict` if it would create a second active
    /// booking for its user or bed.
    async fn insert(&self, booking: &Booking) -> Result<(), BookingError>;

    /// Physically delete a booking. Only used to compensate a failed create.
    ///
    /// Returns `true` if a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, BookingError>;

    /// A booking by id.
    async fn get(&self, id: Uuid) -> Result<Option<Booking>, BookingError>;

    /// Bookings matching `filter`, newest `booking_date` first.
    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, BookingError>;

    /// Transition an active booking to cancelled.
    ///
    /// Returns `None` if the booking does not exist or is not active.
    async fn mark_cancelled(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Booking>, BookingError>;
}

/// PostgreSQL-backed booking store.
#[derive(Clone)]
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_active_by(
        &self,
        column: ActiveLookup,
        value: &str,
    ) -> Result<Option<Booking>, BookingError> {
        let sql = match column {
            ActiveLookup::User => format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 AND status = 'active'"
            ),
            ActiveLookup::Bed => format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings WHERE bed_id = $1 AND status = 'active'"
            ),
        };

        sqlx::query_as::<_, BookingRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?
            .map(Booking::try_from)
            .transpose()
    }
}

#[derive(Debug, Clone, Copy)]
enum ActiveLookup {
    User,
    Bed,
}

/// Map a unique-index violation to the matching conflict.
fn map_insert_error(err: sqlx::Error) -> BookingError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(ACTIVE_PER_USER_INDEX) => {
                    return BookingError::Conflict(ACTIVE_BOOKING_EXISTS.to_string())
                }
                Some(ACTIVE_PER_BED_INDEX) => {
                    return BookingError::Conflict(BED_ALREADY_OCCUPIED.to_string())
                }
                _ => {}
            }
        }
    }
    BookingError::Database(err.to_string())
}

#[async_trait::async_trait]
impl BookingRepository for PgBookingRepository {
    #[instrument(skip_all, name = "booking.repo.find_active_for_user")]
    async fn find_active_for_user(&self, user_id: &str) -> Result<Option<Booking>, BookingError> {
        self.find_active_by(ActiveLookup::User, user_id).await
    }

    #[instrument(skip_all, name = "booking.repo.find_active_for_bed")]
    async fn find_active_for_bed(&self, bed_id: &str) -> Result<Option<Booking>, BookingError> {
        self.find_active_by(ActiveLookup::Bed, bed_id).await
    }

    #[instrument(skip_all, name = "booking.repo.insert", fields(booking_id = %booking.id))]
    async fn insert(&self, booking: &Booking) -> Result<(), BookingError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, user_id, user_name, building_id, building_name,
                room_id, room_number, bed_id, bed_number, booking_date,
                status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(booking.id) // $1
        .bind(&booking.user_id) // $2
        .bind(&booking.user_name) // $3
        .bind(&booking.building_id) // $4
        .bind(&booking.building_name) // $5
        .bind(&booking.room_id) // $6
        .bind(&booking.room_number) // $7
        .bind(&booking.bed_id) // $8
        .bind(booking.bed_number) // $9
        .bind(booking.booking_date) // $10
        .bind(booking.status.as_str()) // $11
        .bind(booking.created_at) // $12
        .bind(booking.updated_at) // $13
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(())
    }

    #[instrument(skip_all, name = "booking.repo.delete", fields(booking_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, BookingError> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip_all, name = "booking.repo.get", fields(booking_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Booking>, BookingError> {
        sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Booking::try_from)
        .transpose()
    }

    #[instrument(skip_all, name = "booking.repo.list")]
    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, BookingError> {
        let rows = match filter {
            BookingFilter::All => {
                sqlx::query_as::<_, BookingRow>(&format!(
                    "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY booking_date DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
            BookingFilter::ByUser(user_id) => {
                sqlx::query_as::<_, BookingRow>(&format!(
                    "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY booking_date DESC"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(Booking::try_from).collect()
    }

    #[instrument(skip_all, name = "booking.repo.mark_cancelled", fields(booking_id = %id))]
    async fn mark_cancelled(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Booking>, BookingError> {
        // Conditional on status so concurrent cancels cannot both succeed
        sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            UPDATE bookings
            SET status = $1, updated_at = $2
            WHERE id = $3 AND status = $4
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(BookingStatus::Cancelled.as_str())
        .bind(at)
        .bind(id)
        .bind(BookingStatus::Active.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(Booking::try_from)
        .transpose()
    }
}

/// In-memory booking store for tests.
///
/// Enforces the same uniqueness rules as the partial unique indexes.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryBookingRepository {
        bookings: Mutex<Vec<Booking>>,
        fail_deletes: AtomicBool,
        delete_calls: AtomicUsize,
    }

    impl InMemoryBookingRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every subsequent `delete` fail with a database error.
        pub fn fail_deletes(&self) {
            self.fail_deletes.store(true, Ordering::SeqCst);
        }

        /// Number of `delete` calls made.
        pub fn delete_calls(&self) -> usize {
            self.delete_calls.load(Ordering::SeqCst)
        }

        /// Snapshot of all stored bookings.
        pub fn snapshot(&self) -> Vec<Booking> {
            self.lock().clone()
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Booking>> {
            // A poisoned lock only means another test thread panicked
            self.bookings
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
        }
    }

    #[async_trait::async_trait]
    impl BookingRepository for InMemoryBookingRepository {
        async fn find_active_for_user(
            &self,
            user_id: &str,
        ) -> Result<Option<Booking>, BookingError> {
            Ok(self
                .lock()
                .iter()
                .find(|b| b.is_active() && b.user_id == user_id)
                .cloned())
        }

        async fn find_active_for_bed(&self, bed_id: &str) -> Result<Option<Booking>, BookingError> {
            Ok(self
                .lock()
                .iter()
                .find(|b| b.is_active() && b.bed_id == bed_id)
                .cloned())
        }

        async fn insert(&self, booking: &Booking) -> Result<(), BookingError> {
            let mut bookings = self.lock();
            if booking.is_active() {
                if bookings
                    .iter()
                    .any(|b| b.is_active() && b.user_id == booking.user_id)
                {
                    return Err(BookingError::Conflict(ACTIVE_BOOKING_EXISTS.to_string()));
                }
                if bookings
                    .iter()
                    .any(|b| b.is_active() && b.bed_id == booking.bed_id)
                {
                    return Err(BookingError::Conflict(BED_ALREADY_OCCUPIED.to_string()));
                }
            }
            if bookings.iter().any(|b| b.id == booking.id) {
                return Err(BookingError::Database("duplicate primary key".to_string()));
            }
            bookings.push(booking.clone());
            Ok(())
        }

        async fn delete(&self, id: Uuid) -> Result<bool, BookingError> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(BookingError::Database("mock delete failure".to_string()));
            }
            let mut bookings = self.lock();
            let before = bookings.len();
            bookings.retain(|b| b.id != id);
            Ok(bookings.len() < before)
        }

        async fn get(&self, id: Uuid) -> Result<Option<Booking>, BookingError> {
            Ok(self.lock().iter().find(|b| b.id == id).cloned())
        }

        async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, BookingError> {
            let mut bookings: Vec<Booking> = self
                .lock()
                .iter()
                .filter(|b| match filter {
                    BookingFilter::All => true,
                    BookingFilter::ByUser(user_id) => &b.user_id == user_id,
                })
                .cloned()
                .collect();
            bookings.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));
            Ok(bookings)
        }

        async fn mark_cancelled(
            &self,
            id: Uuid,
            at: DateTime<Utc>,
        ) -> Result<Option<Booking>, BookingError> {
            let mut bookings = self.lock();
            Ok(bookings
                .iter_mut()
                .find(|b| b.id == id && b.is_active())
                .map(|b| {
                    b.status = BookingStatus::Cancelled;
                    b.updated_at = at;
                    b.clone()
                }))
        }
    }

}
