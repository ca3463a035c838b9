//! Booking lifecycle service
//!
//! Owns the booking state machine, the relationship checks gating every
//! booking operation, the time-window list queries and the derived
//! comment-eligibility rule.

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{page_offset, Booking, BookingDetails, BookingStatus, CreateBooking, StateFilter},
        item::Item,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BookingsService {
    repository: Repository,
}

impl BookingsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a booking request against an available item.
    ///
    /// Overlapping bookings of the same item are not rejected here; approval
    /// stays entirely with the owner.
    pub async fn create(&self, booker_id: i32, request: CreateBooking) -> AppResult<BookingDetails> {
        let booker = self.repository.users.get_by_id(booker_id).await?;
        let item = self.repository.items.get_by_id(request.item_id).await?;

        if !item.available {
            return Err(AppError::Validation(format!(
                "Item {} is not available for booking",
                item.id
            )));
        }
        ensure_not_own_item(&item, booker.id)?;
        validate_period(request.start, request.end)?;

        let id = self
            .repository
            .bookings
            .create(booker.id, item.id, request.start, request.end)
            .await?;

        tracing::info!("User {} opened booking {} on item {}", booker.id, id, item.id);

        self.repository.bookings.get_details(id).await
    }

    /// Approve or reject a waiting booking. Only the booked item's owner may
    /// review, and an approved booking can no longer be reviewed. The review
    /// is a plain read-then-write: concurrent reviews of the same booking are
    /// last-write-wins.
    pub async fn set_approval(
        &self,
        caller_id: i32,
        booking_id: i32,
        approved: bool,
    ) -> AppResult<BookingDetails> {
        if !self.repository.users.exists(caller_id).await? {
            return Err(AppError::NotFound(format!("User with id {} not found", caller_id)));
        }

        let booking = self.repository.bookings.get_by_id(booking_id).await?;
        let item = self.repository.items.get_by_id(booking.item_id).await?;
        ensure_reviewer_is_owner(&item, caller_id)?;

        let allowed = if approved {
            booking.status.can_approve()
        } else {
            booking.status.can_reject()
        };
        if !allowed {
            return Err(AppError::Validation(match booking.status {
                BookingStatus::Approved => "already approved".to_string(),
                status => format!("cannot review booking in status {}", status),
            }));
        }

        let status = if approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        };
        self.repository.bookings.set_status(booking_id, status).await?;

        tracing::info!("Owner {} set booking {} to {}", caller_id, booking_id, status);

        self.repository.bookings.get_details(booking_id).await
    }

    /// Get one booking; visible only to its booker and the item's owner
    pub async fn get_by_id(&self, caller_id: i32, booking_id: i32) -> AppResult<BookingDetails> {
        if !self.repository.users.exists(caller_id).await? {
            return Err(AppError::NotFound(format!("User with id {} not found", caller_id)));
        }

        let booking = self.repository.bookings.get_by_id(booking_id).await?;
        let item = self.repository.items.get_by_id(booking.item_id).await?;
        ensure_viewer(&booking, &item, caller_id)?;

        self.repository.bookings.get_details(booking_id).await
    }

    /// List the caller's own bookings for a state filter
    pub async fn list_for_booker(
        &self,
        caller_id: i32,
        state: &str,
        from: i32,
        size: i32,
    ) -> AppResult<Vec<BookingDetails>> {
        if !self.repository.users.exists(caller_id).await? {
            return Err(AppError::NotFound(format!("User with id {} not found", caller_id)));
        }
        let filter: StateFilter = state.parse().map_err(AppError::UnsupportedState)?;

        // One instant for every time comparison in this call
        let now = Utc::now();
        self.repository
            .bookings
            .find_for_booker(caller_id, filter, now, size as i64, page_offset(from, size))
            .await
    }

    /// List bookings on items the caller owns for a state filter
    pub async fn list_for_owner(
        &self,
        caller_id: i32,
        state: &str,
        from: i32,
        size: i32,
    ) -> AppResult<Vec<BookingDetails>> {
        if !self.repository.users.exists(caller_id).await? {
            return Err(AppError::NotFound(format!("User with id {} not found", caller_id)));
        }
        let filter: StateFilter = state.parse().map_err(AppError::UnsupportedState)?;

        let now = Utc::now();
        self.repository
            .bookings
            .find_for_owner(caller_id, filter, now, size as i64, page_offset(from, size))
            .await
    }

    /// Decide whether `user_id` may attach a comment to `item_id`.
    ///
    /// Two distinct checks with distinct failures: the user must have some
    /// approved booking (of any item), and the item must have an approved
    /// booking that already started.
    pub async fn ensure_can_comment(&self, user_id: i32, item_id: i32) -> AppResult<()> {
        if !self.repository.items.exists(item_id).await? {
            return Err(AppError::NotFound(format!("Item with id {} not found", item_id)));
        }
        if !self.repository.users.exists(user_id).await? {
            return Err(AppError::NotFound(format!("User with id {} not found", user_id)));
        }

        if !self.repository.bookings.user_has_approved_booking(user_id).await? {
            return Err(AppError::NotBooked("didn't book item".to_string()));
        }

        let now = Utc::now();
        if !self.repository.bookings.item_has_started_booking(item_id, now).await? {
            return Err(AppError::Validation("item didn't book yet".to_string()));
        }

        Ok(())
    }
}

/// Booking period must be non-empty: equal instants are rejected
fn validate_period(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<()> {
    if start >= end {
        return Err(AppError::Validation(
            "Booking end must be strictly after start".to_string(),
        ));
    }
    Ok(())
}

/// An owner may not book their own item
fn ensure_not_own_item(item: &Item, booker_id: i32) -> AppResult<()> {
    if item.owner_id == booker_id {
        return Err(AppError::Authorization("cannot book own item".to_string()));
    }
    Ok(())
}

/// Only the booked item's owner may review a booking
fn ensure_reviewer_is_owner(item: &Item, caller_id: i32) -> AppResult<()> {
    if item.owner_id != caller_id {
        return Err(AppError::Authorization("not owner of booked item".to_string()));
    }
    Ok(())
}

/// A booking is visible to its booker and to the item's owner, nobody else
fn ensure_viewer(booking: &Booking, item: &Item, caller_id: i32) -> AppResult<()> {
    if booking.booker_id != caller_id && item.owner_id != caller_id {
        return Err(AppError::Authorization(
            "not item or booking owner".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item(id: i32, owner_id: i32) -> Item {
        Item {
            id,
            name: "drill".to_string(),
            description: "cordless drill".to_string(),
            available: true,
            owner_id,
            request_id: None,
        }
    }

    fn booking(booker_id: i32, item_id: i32) -> Booking {
        let now = Utc::now();
        Booking {
            id: 1,
            start_date: now + Duration::days(1),
            end_date: now + Duration::days(2),
            status: BookingStatus::Waiting,
            item_id,
            booker_id,
        }
    }

    #[test]
    fn test_period_must_be_non_empty() {
        let now = Utc::now();
        assert!(validate_period(now, now + Duration::hours(1)).is_ok());
        assert!(matches!(
            validate_period(now, now),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_period(now + Duration::hours(1), now),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_owner_cannot_book_own_item() {
        let item = item(10, 9);
        assert!(ensure_not_own_item(&item, 2).is_ok());
        assert!(matches!(
            ensure_not_own_item(&item, 9),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn test_only_owner_reviews() {
        let item = item(10, 9);
        assert!(ensure_reviewer_is_owner(&item, 9).is_ok());
        assert!(matches!(
            ensure_reviewer_is_owner(&item, 2),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn test_booking_visible_to_booker_and_owner_only() {
        let item = item(10, 74);
        let booking = booking(96, 10);
        assert!(ensure_viewer(&booking, &item, 96).is_ok());
        assert!(ensure_viewer(&booking, &item, 74).is_ok());
        assert!(matches!(
            ensure_viewer(&booking, &item, 45),
            Err(AppError::Authorization(_))
        ));
    }
}
