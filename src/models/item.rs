//! Item (listing) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::booking::BookingBrief;
use super::comment::CommentView;

/// Item row from database
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub available: bool,
    #[serde(skip_serializing)]
    pub owner_id: i32,
    /// Wishlist request this item was listed in answer to, if any
    pub request_id: Option<i32>,
}

/// Short item representation embedded in booking views
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemShort {
    pub id: i32,
    pub name: String,
}

/// Item with booking context and comments.
/// `last_booking` and `next_booking` are only populated for the item's owner.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemDetails {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i32>,
    pub last_booking: Option<BookingBrief>,
    pub next_booking: Option<BookingBrief>,
    pub comments: Vec<CommentView>,
}

/// Create item request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateItem {
    #[validate(length(min = 1, message = "Name must not be blank"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description must not be blank"))]
    pub description: String,
    pub available: bool,
    pub request_id: Option<i32>,
}

/// Update item request; absent fields are left untouched
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateItem {
    #[validate(length(min = 1, message = "Name must not be blank"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Description must not be blank"))]
    pub description: Option<String>,
    pub available: Option<bool>,
}
