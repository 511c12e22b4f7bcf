//! Booking handlers.
//!
//! - `POST /api/bookings` - Create a booking
//! - `GET /api/bookings` - All bookings (admin)
//! - `GET /api/bookings/{id}` - One booking
//! - `PUT /api/bookings/{id}/cancel` - Cancel a booking
//! - `GET /api/bookings/users/{userId}` - A user's bookings
//!
//! Every route sits behind the auth gate. Students may only touch their own
//! bookings; admins may touch any.

use crate::errors::{BookingError, BOOKING_NOT_FOUND};
use crate::models::{BookingFilter, BookingResponse, BookingsResponse, CreateBookingRequest};
use crate::routes::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use common::jwt::TokenClaims;
use common::types::Role;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Reject callers acting on someone else's bookings.
fn ensure_owner_or_admin(claims: &TokenClaims, user_id: &str) -> Result<(), BookingError> {
    if claims.has_role(Role::Admin) || claims.user_id == user_id {
        Ok(())
    } else {
        tracing::debug!(
            target: "booking.handler",
            caller = %claims.user_id,
            owner = %user_id,
            "Ownership check failed"
        );
        Err(BookingError::Forbidden("Insufficient permissions".to_string()))
    }
}

/// A malformed id cannot name a booking.
fn parse_booking_id(raw: &str) -> Result<Uuid, BookingError> {
    Uuid::parse_str(raw).map_err(|_| BookingError::NotFound(BOOKING_NOT_FOUND.to_string()))
}

#[instrument(skip_all, name = "booking.handler.create_booking")]
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<TokenClaims>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingResponse>), BookingError> {
    let Json(request) =
        payload.map_err(|_| BookingError::BadRequest("Invalid request body".to_string()))?;
    request.validate()?;
    ensure_owner_or_admin(&claims, &request.user_id)?;

    let booking = state.bookings.create(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            success: true,
            message: Some("Booking created successfully".to_string()),
            booking,
        }),
    ))
}

#[instrument(skip_all, name = "booking.handler.list_all_bookings")]
pub async fn list_all_bookings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BookingsResponse>, BookingError> {
    let bookings = state.bookings.list(&BookingFilter::All).await?;
    Ok(Json(BookingsResponse {
        success: true,
        bookings,
    }))
}

#[instrument(skip_all, name = "booking.handler.get_booking", fields(booking_id = %raw_id))]
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<TokenClaims>,
    Path(raw_id): Path<String>,
) -> Result<Json<BookingResponse>, BookingError> {
    let booking = state.bookings.get(parse_booking_id(&raw_id)?).await?;
    ensure_owner_or_admin(&claims, &booking.user_id)?;

    Ok(Json(BookingResponse {
        success: true,
        message: None,
        booking,
    }))
}

#[instrument(skip_all, name = "booking.handler.cancel_booking", fields(booking_id = %raw_id))]
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<TokenClaims>,
    Path(raw_id): Path<String>,
) -> Result<Json<BookingResponse>, BookingError> {
    let id = parse_booking_id(&raw_id)?;
    let existing = state.bookings.get(id).await?;
    ensure_owner_or_admin(&claims, &existing.user_id)?;

    let booking = state.bookings.cancel(id).await?;

    Ok(Json(BookingResponse {
        success: true,
        message: Some("Booking cancelled successfully".to_string()),
        booking,
    }))
}

#[instrument(skip_all, name = "booking.handler.list_user_bookings", fields(user_id = %user_id))]
pub async fn list_user_bookings(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<TokenClaims>,
    Path(user_id): Path<String>,
) -> Result<Json<BookingsResponse>, BookingError> {
    ensure_owner_or_admin(&claims, &user_id)?;

    let bookings = state.bookings.list(&BookingFilter::ByUser(user_id)).await?;
    Ok(Json(BookingsResponse {
        success: true,
        bookings,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(user_id: &str, role: Role) -> TokenClaims {
        TokenClaims {
            user_id: user_id.to_string(),
            email: format!("{user_id}@example.com"),
            name: user_id.to_string(),
            role,
            iat: 0,
            exp: 1,
        }
    }

    #[test]
    fn test_owner_may_act() {
        assert!(ensure_owner_or_admin(&claims("u-1", Role::Student), "u-1").is_ok());
    }

    #[test]
    fn test_student_may_not_act_for_others() {
        assert!(matches!(
            ensure_owner_or_admin(&claims("u-1", Role::Student), "u-2"),
            Err(BookingError::Forbidden(_))
        ));
    }

    #[test]
    fn test_admin_may_act_for_anyone() {
        assert!(ensure_owner_or_admin(&claims("admin-1", Role::Admin), "u-2").is_ok());
    }

    #[test]
    fn test_malformed_id_is_not_found() {
        assert!(matches!(
            parse_booking_id("not-a-uuid"),
            Err(BookingError::NotFound(_))
        ));
        assert!(parse_booking_id("6f1c2b9e-1d7a-4a7e-9f59-3c1b2f0a8e11").is_ok());
    }
}
