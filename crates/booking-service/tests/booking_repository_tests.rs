//! PostgreSQL booking repository tests.
//!
//! Exercise the partial unique indexes directly, without the state
//! machine's fast-path checks in front of them.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use booking_service::errors::{BookingError, ACTIVE_BOOKING_EXISTS, BED_ALREADY_OCCUPIED};
use booking_service::models::{Booking, BookingFilter, BookingStatus};
use booking_service::repositories::{BookingRepository, PgBookingRepository};
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

fn booking(user_id: &str, bed_id: &str) -> Booking {
    let now = Utc::now();
    Booking {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        user_name: format!("{user_id} name"),
        building_id: "bldg-1".to_string(),
        building_name: "RK A".to_string(),
        room_id: "bldg-1-room-001".to_string(),
        room_number: "001".to_string(),
        bed_id: bed_id.to_string(),
        bed_number: 1,
        booking_date: now,
        status: BookingStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

#[sqlx::test(migrations = "../../migrations/booking")]
async fn test_second_active_booking_for_user_conflicts(pool: PgPool) -> Result<(), anyhow::Error> {
    let repo = PgBookingRepository::new(pool);
    repo.insert(&booking("u-1", "bed-1")).await?;

    let result = repo.insert(&booking("u-1", "bed-2")).await;

    assert!(
        matches!(&result, Err(BookingError::Conflict(message)) if message == ACTIVE_BOOKING_EXISTS),
        "got {result:?}"
    );
    Ok(())
}

#[sqlx::test(migrations = "../../migrations/booking")]
async fn test_second_active_booking_for_bed_conflicts(pool: PgPool) -> Result<(), anyhow::Error> {
    let repo = PgBookingRepository::new(pool);
    repo.insert(&booking("u-1", "bed-1")).await?;

    let result = repo.insert(&booking("u-2", "bed-1")).await;

    assert!(
        matches!(&result, Err(BookingError::Conflict(message)) if message == BED_ALREADY_OCCUPIED),
        "got {result:?}"
    );
    Ok(())
}

#[sqlx::test(migrations = "../../migrations/booking")]
async fn test_primary_key_collision_is_not_a_conflict(pool: PgPool) -> Result<(), anyhow::Error> {
    let repo = PgBookingRepository::new(pool);
    let first = booking("u-1", "bed-1");
    repo.insert(&first).await?;

    let mut duplicate_id = booking("u-2", "bed-2");
    duplicate_id.id = first.id;

    let result = repo.insert(&duplicate_id).await;
    assert!(matches!(result, Err(BookingError::Database(_))), "got {result:?}");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations/booking")]
async fn test_cancelled_booking_frees_user_and_bed(pool: PgPool) -> Result<(), anyhow::Error> {
    let repo = PgBookingRepository::new(pool);
    let first = booking("u-1", "bed-1");
    repo.insert(&first).await?;

    let cancelled = repo.mark_cancelled(first.id, Utc::now()).await?.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);

    // Only one transition out of active
    assert!(repo.mark_cancelled(first.id, Utc::now()).await?.is_none());

    // Both indexes are partial, so the same user and bed can book again
    repo.insert(&booking("u-1", "bed-1")).await?;
    assert!(repo.find_active_for_user("u-1").await?.is_some());
    assert!(repo.find_active_for_bed("bed-1").await?.is_some());

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/booking")]
async fn test_delete_and_list_order(pool: PgPool) -> Result<(), anyhow::Error> {
    let repo = PgBookingRepository::new(pool);

    let mut older = booking("u-1", "bed-1");
    older.booking_date = Utc::now() - Duration::hours(1);
    let newer = booking("u-2", "bed-2");
    repo.insert(&older).await?;
    repo.insert(&newer).await?;

    let all = repo.list(&BookingFilter::All).await?;
    let ids: Vec<Uuid> = all.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);

    assert!(repo.delete(older.id).await?);
    assert!(!repo.delete(older.id).await?);
    assert!(repo.get(older.id).await?.is_none());
    assert!(repo
        .list(&BookingFilter::ByUser("u-1".to_string()))
        .await?
        .is_empty());

    Ok(())
}
