//! Comment model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Comment row from database
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: i32,
    pub text: String,
    pub item_id: i32,
    pub author_id: i32,
    pub created: DateTime<Utc>,
}

/// Comment as shown on an item, with the author's name resolved
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentView {
    pub id: i32,
    pub text: String,
    pub author_name: String,
    pub created: DateTime<Utc>,
}

/// Create comment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateComment {
    #[validate(length(min = 1, message = "Comment text must not be blank"))]
    pub text: String,
}
