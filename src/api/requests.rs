//! Item request (wishlist) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::request::{CreateRequest, RequestDetails},
};

use super::CallerId;

/// Pagination query for browsing other users' requests
#[derive(Debug, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Zero-based row offset
    #[serde(default)]
    pub from: i32,
    /// Page size
    #[serde(default = "default_size")]
    pub size: i32,
}

fn default_size() -> i32 {
    10
}

/// Post a new wishlist request
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    request_body = CreateRequest,
    params(
        ("X-Sharer-User-Id" = i32, Header, description = "Calling user ID")
    ),
    responses(
        (status = 201, description = "Request created", body = RequestDetails),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "User not found")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Json(request): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<RequestDetails>)> {
    request.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let created = state.services.requests.create(caller_id, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List the caller's own requests with answering items
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    params(
        ("X-Sharer-User-Id" = i32, Header, description = "Calling user ID")
    ),
    responses(
        (status = 200, description = "Caller's requests", body = Vec<RequestDetails>),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_own_requests(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
) -> AppResult<Json<Vec<RequestDetails>>> {
    let requests = state.services.requests.list_own(caller_id).await?;
    Ok(Json(requests))
}

/// Browse other users' requests, newest first
#[utoipa::path(
    get,
    path = "/requests/all",
    tag = "requests",
    params(
        PageQuery,
        ("X-Sharer-User-Id" = i32, Header, description = "Calling user ID")
    ),
    responses(
        (status = 200, description = "Other users' requests", body = Vec<RequestDetails>),
        (status = 400, description = "Bad page parameters"),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_all_requests(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Vec<RequestDetails>>> {
    if query.from < 0 {
        return Err(AppError::Validation("from must not be negative".to_string()));
    }
    if query.size <= 0 {
        return Err(AppError::Validation("size must be positive".to_string()));
    }

    let requests = state
        .services
        .requests
        .list_others(caller_id, query.from, query.size)
        .await?;
    Ok(Json(requests))
}

/// Get one request with answering items
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    params(
        ("id" = i32, Path, description = "Request ID"),
        ("X-Sharer-User-Id" = i32, Header, description = "Calling user ID")
    ),
    responses(
        (status = 200, description = "Request details", body = RequestDetails),
        (status = 404, description = "User or request not found")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Path(id): Path<i32>,
) -> AppResult<Json<RequestDetails>> {
    let request = state.services.requests.get_by_id(caller_id, id).await?;
    Ok(Json(request))
}
