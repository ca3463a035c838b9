//! Business logic services

pub mod bookings;
pub mod items;
pub mod requests;
pub mod users;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub items: items::ItemsService,
    pub bookings: bookings::BookingsService,
    pub requests: requests::RequestsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        let bookings = bookings::BookingsService::new(repository.clone());
        Self {
            users: users::UsersService::new(repository.clone()),
            items: items::ItemsService::new(repository.clone(), bookings.clone()),
            requests: requests::RequestsService::new(repository),
            bookings,
        }
    }
}
