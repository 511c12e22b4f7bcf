//! Data models for the booking service.

use crate::errors::BookingError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Booking lifecycle state. `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Active,
    Cancelled,
}

impl BookingStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Active => "active",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(BookingStatus::Active),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(BookingError::Internal(format!(
                "unknown booking status: {other}"
            ))),
        }
    }
}

/// Booking row as stored.
#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    pub id: Uuid,
    pub user_id: String,
    pub user_name: String,
    pub building_id: String,
    pub building_name: String,
    pub room_id: String,
    pub room_number: String,
    pub bed_id: String,
    pub bed_number: i32,
    pub booking_date: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: String,
    pub user_name: String,
    pub building_id: String,
    pub building_name: String,
    pub room_id: String,
    pub room_number: String,
    pub bed_id: String,
    pub bed_number: i32,
    pub booking_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Active
    }
}

impl TryFrom<BookingRow> for Booking {
    type Error = BookingError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            user_id: row.user_id,
            user_name: row.user_name,
            building_id: row.building_id,
            building_name: row.building_name,
            room_id: row.room_id,
            room_number: row.room_number,
            bed_id: row.bed_id,
            bed_number: row.bed_number,
            booking_date: row.booking_date,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Body of `POST /api/bookings`.
///
/// Only `user_id` and `bed_id` are required; the descriptive fields are
/// copied onto the booking as given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub building_id: String,
    #[serde(default)]
    pub building_name: String,
    #[serde(default)]
    pub room_id: String,
    #[serde(default)]
    pub room_number: String,
    #[serde(default)]
    pub bed_id: String,
    #[serde(default)]
    pub bed_number: i32,
}

/// Width of the booking text columns.
pub const MAX_FIELD_LENGTH: usize = 255;

/// Width of the `room_number` column.
pub const MAX_ROOM_NUMBER_LENGTH: usize = 50;

impl CreateBookingRequest {
    /// Reject requests missing a user or bed id, or with fields wider than
    /// their columns.
    pub fn validate(&self) -> Result<(), BookingError> {
        if self.user_id.trim().is_empty() || self.bed_id.trim().is_empty() {
            return Err(BookingError::BadRequest(
                "User ID and Bed ID are required".to_string(),
            ));
        }

        let fields = [
            ("user_id", &self.user_id, MAX_FIELD_LENGTH),
            ("user_name", &self.user_name, MAX_FIELD_LENGTH),
            ("building_id", &self.building_id, MAX_FIELD_LENGTH),
            ("building_name", &self.building_name, MAX_FIELD_LENGTH),
            ("room_id", &self.room_id, MAX_FIELD_LENGTH),
            ("room_number", &self.room_number, MAX_ROOM_NUMBER_LENGTH),
            ("bed_id", &self.bed_id, MAX_FIELD_LENGTH),
        ];
        for (name, value, max) in fields {
            // VARCHAR(n) counts characters, not bytes
            if value.chars().count() > max {
                return Err(BookingError::BadRequest(format!(
                    "{name} must be at most {max} characters"
                )));
            }
        }

        Ok(())
    }
}

/// Which bookings to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingFilter {
    All,
    ByUser(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub booking: Booking,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingsResponse {
    pub success: bool,
    pub bookings: Vec<Booking>,
}
