//! API handlers for LendHub REST endpoints

pub mod bookings;
pub mod health;
pub mod items;
pub mod openapi;
pub mod requests;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};

use crate::{error::AppError, AppState};

/// Header carrying the authenticated caller's user id, set by the gateway
pub const CALLER_HEADER: &str = "X-Sharer-User-Id";

/// Extractor for the calling user's id from the gateway header
pub struct CallerId(pub i32);

#[async_trait]
impl FromRequestParts<AppState> for CallerId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(CALLER_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::BadRequest(format!("Missing {} header", CALLER_HEADER)))?;

        let caller_id = header
            .parse::<i32>()
            .map_err(|_| AppError::BadRequest(format!("Invalid {} header", CALLER_HEADER)))?;

        Ok(CallerId(caller_id))
    }
}
