//! Booking lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::{AppError, AppResult},
    models::booking::{BookingDetails, CreateBooking},
};

use super::CallerId;

fn default_state() -> String {
    "ALL".to_string()
}

/// Booking list query: state filter plus page-addressed offset
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    /// State filter, case-insensitive (ALL, CURRENT, PAST, FUTURE, WAITING, REJECTED)
    #[serde(default = "default_state")]
    pub state: String,
    /// Zero-based offset into the page sequence
    #[serde(default)]
    pub from: i32,
    /// Page size
    #[serde(default = "default_size")]
    pub size: i32,
}

fn default_size() -> i32 {
    10
}

/// Approval decision query
#[derive(Debug, Deserialize, IntoParams)]
pub struct ApprovalQuery {
    pub approved: bool,
}

fn validate_page(from: i32, size: i32) -> AppResult<()> {
    if from < 0 {
        return Err(AppError::Validation("from must not be negative".to_string()));
    }
    if size <= 0 {
        return Err(AppError::Validation("size must be positive".to_string()));
    }
    Ok(())
}

/// Request a booking of an item
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    request_body = CreateBooking,
    params(
        ("X-Sharer-User-Id" = i32, Header, description = "Calling user ID")
    ),
    responses(
        (status = 201, description = "Booking created in WAITING state", body = BookingDetails),
        (status = 400, description = "Item unavailable or invalid period"),
        (status = 403, description = "Caller owns the item"),
        (status = 404, description = "User or item not found")
    )
)]
pub async fn create_booking(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Json(booking): Json<CreateBooking>,
) -> AppResult<(StatusCode, Json<BookingDetails>)> {
    let created = state.services.bookings.create(caller_id, booking).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Approve or reject a booking; item owner only
#[utoipa::path(
    patch,
    path = "/bookings/{id}",
    tag = "bookings",
    params(
        ("id" = i32, Path, description = "Booking ID"),
        ApprovalQuery,
        ("X-Sharer-User-Id" = i32, Header, description = "Calling user ID")
    ),
    responses(
        (status = 200, description = "Booking reviewed", body = BookingDetails),
        (status = 400, description = "Booking already approved"),
        (status = 403, description = "Caller does not own the booked item"),
        (status = 404, description = "User or booking not found")
    )
)]
pub async fn set_approval(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Path(id): Path<i32>,
    Query(query): Query<ApprovalQuery>,
) -> AppResult<Json<BookingDetails>> {
    let booking = state
        .services
        .bookings
        .set_approval(caller_id, id, query.approved)
        .await?;
    Ok(Json(booking))
}

/// Get one booking; visible to the booker and the item's owner
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    params(
        ("id" = i32, Path, description = "Booking ID"),
        ("X-Sharer-User-Id" = i32, Header, description = "Calling user ID")
    ),
    responses(
        (status = 200, description = "Booking details", body = BookingDetails),
        (status = 403, description = "Caller is neither booker nor item owner"),
        (status = 404, description = "User or booking not found")
    )
)]
pub async fn get_booking(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Path(id): Path<i32>,
) -> AppResult<Json<BookingDetails>> {
    let booking = state.services.bookings.get_by_id(caller_id, id).await?;
    Ok(Json(booking))
}

/// List the caller's bookings for a state filter
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    params(
        ListQuery,
        ("X-Sharer-User-Id" = i32, Header, description = "Calling user ID")
    ),
    responses(
        (status = 200, description = "Caller's bookings", body = Vec<BookingDetails>),
        (status = 400, description = "Unknown state filter or bad page"),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_bookings(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<BookingDetails>>> {
    validate_page(query.from, query.size)?;

    let bookings = state
        .services
        .bookings
        .list_for_booker(caller_id, &query.state, query.from, query.size)
        .await?;
    Ok(Json(bookings))
}

/// List bookings on items the caller owns for a state filter
#[utoipa::path(
    get,
    path = "/bookings/owner",
    tag = "bookings",
    params(
        ListQuery,
        ("X-Sharer-User-Id" = i32, Header, description = "Calling user ID")
    ),
    responses(
        (status = 200, description = "Bookings on the caller's items", body = Vec<BookingDetails>),
        (status = 400, description = "Unknown state filter or bad page"),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_owner_bookings(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<BookingDetails>>> {
    validate_page(query.from, query.size)?;

    let bookings = state
        .services
        .bookings
        .list_for_owner(caller_id, &query.state, query.from, query.size)
        .await?;
    Ok(Json(bookings))
}
