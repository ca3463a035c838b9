//! Booking model, status state machine and time-window query filters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

use super::item::ItemShort;
use super::user::UserShort;

/// Booking lifecycle status.
///
/// `Canceled` is a historical value kept for bookings withdrawn through
/// legacy flows; the approval operation never produces it and the REJECTED
/// list filter treats it the same as `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
    Canceled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
            BookingStatus::Canceled => "CANCELED",
        }
    }

    /// Whether the approval operation may move this status to `Approved`.
    pub fn can_approve(&self) -> bool {
        matches!(self, BookingStatus::Waiting)
    }

    /// Whether the approval operation may move this status to `Rejected`.
    /// Re-rejecting an already rejected booking is accepted; the rule is
    /// deliberately not symmetric with [`BookingStatus::can_approve`].
    pub fn can_reject(&self) -> bool {
        matches!(self, BookingStatus::Waiting | BookingStatus::Rejected)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAITING" => Ok(BookingStatus::Waiting),
            "APPROVED" => Ok(BookingStatus::Approved),
            "REJECTED" => Ok(BookingStatus::Rejected),
            "CANCELED" => Ok(BookingStatus::Canceled),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

// SQLx conversion for BookingStatus (stored as TEXT)
impl sqlx::Type<Postgres> for BookingStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BookingStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookingStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Time-window filter for booking list queries.
///
/// Parsed case-insensitively from the `state` query parameter. Each variant
/// maps to its own predicate and ordering, executed as a distinct scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFilter {
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

impl std::str::FromStr for StateFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ALL" => Ok(StateFilter::All),
            "CURRENT" => Ok(StateFilter::Current),
            "PAST" => Ok(StateFilter::Past),
            "FUTURE" => Ok(StateFilter::Future),
            "WAITING" => Ok(StateFilter::Waiting),
            "REJECTED" => Ok(StateFilter::Rejected),
            _ => Err(s.to_string()),
        }
    }
}

impl StateFilter {
    /// SQL predicate over the booking row aliased `b`. `$2` is the instant
    /// captured at query entry; variants that never compare against it must
    /// report so through [`StateFilter::binds_now`] so the repository skips
    /// the bind.
    pub fn predicate(&self) -> &'static str {
        match self {
            StateFilter::All => "TRUE",
            StateFilter::Current => "b.start_date < $2 AND b.end_date > $2",
            StateFilter::Past => "b.end_date < $2",
            StateFilter::Future => "b.start_date > $2",
            StateFilter::Waiting => {
                "b.status = 'WAITING' AND (b.start_date < $2 OR b.end_date > $2)"
            }
            StateFilter::Rejected => "b.status IN ('REJECTED', 'CANCELED')",
        }
    }

    /// ORDER BY clause for this filter. CURRENT lists in creation order while
    /// every other filter lists most recent start first.
    pub fn ordering(&self) -> &'static str {
        match self {
            StateFilter::Current => "b.id ASC",
            _ => "b.start_date DESC",
        }
    }

    /// Whether [`StateFilter::predicate`] references the captured instant.
    pub fn binds_now(&self) -> bool {
        !matches!(self, StateFilter::All | StateFilter::Rejected)
    }
}

/// Offset into the booking list for a `(from, size)` page request.
/// `from` addresses the page sequence, not the row sequence: the effective
/// page index is `from / size` and rows are skipped in whole pages.
pub fn page_offset(from: i32, size: i32) -> i64 {
    ((from / size) * size) as i64
}

/// Booking row from database
#[derive(Debug, Clone, FromRow)]
pub struct Booking {
    pub id: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub item_id: i32,
    pub booker_id: i32,
}

/// Booking with resolved booker and item snapshots, as returned to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingDetails {
    pub id: i32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
    pub booker: UserShort,
    pub item: ItemShort,
}

/// Minimal booking reference shown on an item's detail view
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingBrief {
    pub id: i32,
    pub booker_id: i32,
}

/// Create booking request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBooking {
    pub item_id: i32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_approve_only_from_waiting() {
        assert!(BookingStatus::Waiting.can_approve());
        assert!(!BookingStatus::Approved.can_approve());
        assert!(!BookingStatus::Rejected.can_approve());
        assert!(!BookingStatus::Canceled.can_approve());
    }

    #[test]
    fn test_reject_allowed_from_rejected() {
        assert!(BookingStatus::Waiting.can_reject());
        assert!(BookingStatus::Rejected.can_reject());
        assert!(!BookingStatus::Approved.can_reject());
        assert!(!BookingStatus::Canceled.can_reject());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            BookingStatus::Waiting,
            BookingStatus::Approved,
            BookingStatus::Rejected,
            BookingStatus::Canceled,
        ] {
            assert_eq!(BookingStatus::from_str(status.as_str()), Ok(status));
        }
        assert!(BookingStatus::from_str("waiting").is_err());
    }

    #[test]
    fn test_state_filter_case_insensitive() {
        assert_eq!(StateFilter::from_str("ALL"), Ok(StateFilter::All));
        assert_eq!(StateFilter::from_str("current"), Ok(StateFilter::Current));
        assert_eq!(StateFilter::from_str("Past"), Ok(StateFilter::Past));
        assert_eq!(StateFilter::from_str("fUtUrE"), Ok(StateFilter::Future));
        assert_eq!(StateFilter::from_str("waiting"), Ok(StateFilter::Waiting));
        assert_eq!(StateFilter::from_str("rejected"), Ok(StateFilter::Rejected));
    }

    #[test]
    fn test_state_filter_unknown_keeps_input() {
        assert_eq!(StateFilter::from_str("UNIC"), Err("UNIC".to_string()));
    }

    #[test]
    fn test_current_orders_by_id() {
        assert_eq!(StateFilter::Current.ordering(), "b.id ASC");
        for filter in [
            StateFilter::All,
            StateFilter::Past,
            StateFilter::Future,
            StateFilter::Waiting,
            StateFilter::Rejected,
        ] {
            assert_eq!(filter.ordering(), "b.start_date DESC");
        }
    }

    #[test]
    fn test_timeless_filters_skip_now_bind() {
        assert!(!StateFilter::All.binds_now());
        assert!(!StateFilter::Rejected.binds_now());
        assert!(StateFilter::Current.binds_now());
        assert!(StateFilter::Waiting.binds_now());
    }

    #[test]
    fn test_page_offset_snaps_to_page_boundary() {
        assert_eq!(page_offset(0, 5), 0);
        assert_eq!(page_offset(3, 5), 0);
        assert_eq!(page_offset(5, 5), 5);
        assert_eq!(page_offset(7, 5), 5);
        // size = 1 walks rows one at a time
        for from in 0..4 {
            assert_eq!(page_offset(from, 1), from as i64);
        }
    }
}
