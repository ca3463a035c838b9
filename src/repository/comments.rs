//! Comments repository for database operations

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::AppResult,
    models::comment::{Comment, CommentView},
};

#[derive(Clone)]
pub struct CommentsRepository {
    pool: Pool<Postgres>,
}

impl CommentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create a new comment
    pub async fn create(&self, item_id: i32, author_id: i32, text: &str) -> AppResult<Comment> {
        let created = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (text, item_id, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, text, item_id, author_id, created
            "#,
        )
        .bind(text)
        .bind(item_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Comments on an item with author names, newest first
    pub async fn find_by_item(&self, item_id: i32) -> AppResult<Vec<CommentView>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.text, c.created, u.name as author_name
            FROM comments c
            JOIN users u ON c.author_id = u.id
            WHERE c.item_id = $1
            ORDER BY c.created DESC
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| CommentView {
                id: row.get("id"),
                text: row.get("text"),
                author_name: row.get("author_name"),
                created: row.get("created"),
            })
            .collect())
    }
}
