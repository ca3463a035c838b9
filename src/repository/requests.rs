//! Item requests repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::request::{CreateRequest, ItemRequest},
};

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<ItemRequest> {
        sqlx::query_as::<_, ItemRequest>(
            "SELECT id, description, requester_id, created FROM requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", id)))
    }

    /// Create a new request
    pub async fn create(&self, requester_id: i32, request: &CreateRequest) -> AppResult<ItemRequest> {
        let created = sqlx::query_as::<_, ItemRequest>(
            r#"
            INSERT INTO requests (description, requester_id)
            VALUES ($1, $2)
            RETURNING id, description, requester_id, created
            "#,
        )
        .bind(&request.description)
        .bind(requester_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// A user's own requests, newest first
    pub async fn find_by_requester(&self, requester_id: i32) -> AppResult<Vec<ItemRequest>> {
        let requests = sqlx::query_as::<_, ItemRequest>(
            r#"
            SELECT id, description, requester_id, created
            FROM requests
            WHERE requester_id = $1
            ORDER BY created DESC
            "#,
        )
        .bind(requester_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    /// Other users' requests, newest first, paginated
    pub async fn find_others(
        &self,
        requester_id: i32,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<ItemRequest>> {
        let requests = sqlx::query_as::<_, ItemRequest>(
            r#"
            SELECT id, description, requester_id, created
            FROM requests
            WHERE requester_id != $1
            ORDER BY created DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(requester_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }
}
