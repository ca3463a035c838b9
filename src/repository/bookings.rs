//! Bookings repository for database operations
//!
//! List queries are assembled from the `StateFilter`'s (predicate, ordering)
//! pair so every state keeps its own scan shape. Each call binds the single
//! instant captured by the service at entry; a filter that never compares
//! against time skips that bind.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{Booking, BookingBrief, BookingDetails, BookingStatus, StateFilter},
        item::ItemShort,
        user::UserShort,
    },
};

/// Scope fragment restricting a list query to the caller as booker
const SCOPE_BOOKER: &str = "b.booker_id = $1";
/// Scope fragment restricting a list query to items the caller owns
const SCOPE_OWNER: &str = "i.owner_id = $1";

#[derive(Clone)]
pub struct BookingsRepository {
    pool: Pool<Postgres>,
}

impl BookingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get booking by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>(
            "SELECT id, start_date, end_date, status, item_id, booker_id FROM bookings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking with id {} not found", id)))
    }

    /// Create a new booking in WAITING state, returning its id
    pub async fn create(
        &self,
        booker_id: i32,
        item_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO bookings (start_date, end_date, item_id, booker_id, status)
            VALUES ($1, $2, $3, $4, 'WAITING')
            RETURNING id
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(item_id)
        .bind(booker_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Overwrite a booking's status
    pub async fn set_status(&self, id: i32, status: BookingStatus) -> AppResult<()> {
        sqlx::query("UPDATE bookings SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Get a booking with resolved booker and item snapshots
    pub async fn get_details(&self, id: i32) -> AppResult<BookingDetails> {
        let row = sqlx::query(
            r#"
            SELECT b.id, b.start_date, b.end_date, b.status,
                   u.id as booker_id, u.name as booker_name,
                   i.id as item_id, i.name as item_name
            FROM bookings b
            JOIN users u ON b.booker_id = u.id
            JOIN items i ON b.item_id = i.id
            WHERE b.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking with id {} not found", id)))?;

        Ok(details_from_row(&row))
    }

    /// List bookings made by `caller`, filtered and ordered per `filter`
    pub async fn find_for_booker(
        &self,
        caller: i32,
        filter: StateFilter,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<BookingDetails>> {
        self.find_scoped(SCOPE_BOOKER, caller, filter, now, limit, offset).await
    }

    /// List bookings on items owned by `caller`, filtered and ordered per `filter`
    pub async fn find_for_owner(
        &self,
        caller: i32,
        filter: StateFilter,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<BookingDetails>> {
        self.find_scoped(SCOPE_OWNER, caller, filter, now, limit, offset).await
    }

    async fn find_scoped(
        &self,
        scope: &str,
        caller: i32,
        filter: StateFilter,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<BookingDetails>> {
        // $1 = caller, $2 = now (when the filter compares against time),
        // then limit and offset.
        let (limit_ph, offset_ph) = if filter.binds_now() {
            ("$3", "$4")
        } else {
            ("$2", "$3")
        };

        let sql = format!(
            r#"
            SELECT b.id, b.start_date, b.end_date, b.status,
                   u.id as booker_id, u.name as booker_name,
                   i.id as item_id, i.name as item_name
            FROM bookings b
            JOIN users u ON b.booker_id = u.id
            JOIN items i ON b.item_id = i.id
            WHERE {} AND {}
            ORDER BY {}
            LIMIT {} OFFSET {}
            "#,
            scope,
            filter.predicate(),
            filter.ordering(),
            limit_ph,
            offset_ph,
        );

        let mut query = sqlx::query(&sql).bind(caller);
        if filter.binds_now() {
            query = query.bind(now);
        }
        let rows = query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Whether the user has at least one approved booking of any item
    pub async fn user_has_approved_booking(&self, user_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM bookings WHERE booker_id = $1 AND status = 'APPROVED')",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Whether the item has at least one approved booking already started
    pub async fn item_has_started_booking(
        &self,
        item_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE item_id = $1 AND status = 'APPROVED' AND start_date < $2
            )
            "#,
        )
        .bind(item_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Most recent approved booking of the item started at or before `now`
    pub async fn last_for_item(
        &self,
        item_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Option<BookingBrief>> {
        let brief = sqlx::query(
            r#"
            SELECT id, booker_id FROM bookings
            WHERE item_id = $1 AND status = 'APPROVED' AND start_date <= $2
            ORDER BY start_date DESC
            LIMIT 1
            "#,
        )
        .bind(item_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .map(|row| BookingBrief {
            id: row.get("id"),
            booker_id: row.get("booker_id"),
        });
        Ok(brief)
    }

    /// Earliest approved booking of the item starting after `now`
    pub async fn next_for_item(
        &self,
        item_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Option<BookingBrief>> {
        let brief = sqlx::query(
            r#"
            SELECT id, booker_id FROM bookings
            WHERE item_id = $1 AND status = 'APPROVED' AND start_date > $2
            ORDER BY start_date ASC
            LIMIT 1
            "#,
        )
        .bind(item_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .map(|row| BookingBrief {
            id: row.get("id"),
            booker_id: row.get("booker_id"),
        });
        Ok(brief)
    }
}

fn details_from_row(row: &sqlx::postgres::PgRow) -> BookingDetails {
    BookingDetails {
        id: row.get("id"),
        start: row.get("start_date"),
        end: row.get("end_date"),
        status: row.get("status"),
        booker: UserShort {
            id: row.get("booker_id"),
            name: row.get("booker_name"),
        },
        item: ItemShort {
            id: row.get("item_id"),
            name: row.get("item_name"),
        },
    }
}
