//! Item management endpoints

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
    models::{
        comment::{CommentView, CreateComment},
        item::{CreateItem, Item, ItemDetails, UpdateItem},
    },
};

use super::CallerId;

/// Item search query
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Text matched against item name and description
    #[serde(default)]
    pub text: String,
}

/// List the caller's own items with booking context
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i32, Header, description = "Calling user ID")
    ),
    responses(
        (status = 200, description = "Caller's items", body = Vec<ItemDetails>),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_items(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
) -> AppResult<Json<Vec<ItemDetails>>> {
    let items = state.services.items.list_own(caller_id).await?;
    Ok(Json(items))
}

/// Get item details; booking context is included for the owner only
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = i32, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i32, Header, description = "Calling user ID")
    ),
    responses(
        (status = 200, description = "Item details", body = ItemDetails),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Path(id): Path<i32>,
) -> AppResult<Json<ItemDetails>> {
    let item = state.services.items.get_details(caller_id, id).await?;
    Ok(Json(item))
}

/// List a new item for lending
#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    request_body = CreateItem,
    params(
        ("X-Sharer-User-Id" = i32, Header, description = "Calling user ID")
    ),
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "User or wishlist request not found")
    )
)]
pub async fn create_item(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Json(item): Json<CreateItem>,
) -> AppResult<(StatusCode, Json<Item>)> {
    item.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let created = state.services.items.create(caller_id, item).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Partially update an item; owner only
#[utoipa::path(
    patch,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = i32, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i32, Header, description = "Calling user ID")
    ),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 403, description = "Caller does not own the item"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn update_item(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Path(id): Path<i32>,
    Json(item): Json<UpdateItem>,
) -> AppResult<Json<Item>> {
    item.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = state.services.items.update(caller_id, id, item).await?;
    Ok(Json(updated))
}

/// Search available items by text
#[utoipa::path(
    get,
    path = "/items/search",
    tag = "items",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching available items", body = Vec<Item>)
    )
)]
pub async fn search_items(
    State(state): State<crate::AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Item>>> {
    let items = state.services.items.search(&query.text).await?;
    Ok(Json(items))
}

/// Comment on an item after a completed booking
#[utoipa::path(
    post,
    path = "/items/{id}/comment",
    tag = "items",
    params(
        ("id" = i32, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i32, Header, description = "Calling user ID")
    ),
    request_body = CreateComment,
    responses(
        (status = 200, description = "Comment created", body = CommentView),
        (status = 400, description = "Caller has no completed booking of the item"),
        (status = 404, description = "Item or user not found")
    )
)]
pub async fn add_comment(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Path(id): Path<i32>,
    Json(comment): Json<CreateComment>,
) -> AppResult<Json<CommentView>> {
    comment.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let created = state.services.items.add_comment(caller_id, id, comment).await?;
    Ok(Json(created))
}
