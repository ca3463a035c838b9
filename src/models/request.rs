//! Item request (wishlist) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::item::Item;

/// Item request row from database
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ItemRequest {
    pub id: i32,
    pub description: String,
    #[serde(skip_serializing)]
    pub requester_id: i32,
    pub created: DateTime<Utc>,
}

/// Item request with the items listed in answer to it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RequestDetails {
    pub id: i32,
    pub description: String,
    pub created: DateTime<Utc>,
    pub items: Vec<Item>,
}

/// Create item request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRequest {
    #[validate(length(min = 1, message = "Description must not be blank"))]
    pub description: String,
}
