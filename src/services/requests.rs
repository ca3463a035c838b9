//! Item request (wishlist) service

use crate::{
    error::{AppError, AppResult},
    models::request::{CreateRequest, ItemRequest, RequestDetails},
    repository::Repository,
};

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
}

impl RequestsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Post a new wishlist request
    pub async fn create(&self, requester_id: i32, request: CreateRequest) -> AppResult<RequestDetails> {
        if !self.repository.users.exists(requester_id).await? {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                requester_id
            )));
        }
        let created = self.repository.requests.create(requester_id, &request).await?;
        Ok(RequestDetails {
            id: created.id,
            description: created.description,
            created: created.created,
            items: Vec::new(),
        })
    }

    /// The caller's own requests, newest first, with answering items
    pub async fn list_own(&self, caller_id: i32) -> AppResult<Vec<RequestDetails>> {
        if !self.repository.users.exists(caller_id).await? {
            return Err(AppError::NotFound(format!("User with id {} not found", caller_id)));
        }
        let requests = self.repository.requests.find_by_requester(caller_id).await?;
        self.with_items(requests).await
    }

    /// Other users' requests, newest first, paginated
    pub async fn list_others(
        &self,
        caller_id: i32,
        from: i32,
        size: i32,
    ) -> AppResult<Vec<RequestDetails>> {
        if !self.repository.users.exists(caller_id).await? {
            return Err(AppError::NotFound(format!("User with id {} not found", caller_id)));
        }
        let requests = self
            .repository
            .requests
            .find_others(caller_id, size as i64, from as i64)
            .await?;
        self.with_items(requests).await
    }

    /// Get one request with answering items; any existing user may view
    pub async fn get_by_id(&self, caller_id: i32, request_id: i32) -> AppResult<RequestDetails> {
        if !self.repository.users.exists(caller_id).await? {
            return Err(AppError::NotFound(format!("User with id {} not found", caller_id)));
        }
        let request = self.repository.requests.get_by_id(request_id).await?;
        let mut details = self.with_items(vec![request]).await?;
        Ok(details.remove(0))
    }

    async fn with_items(&self, requests: Vec<ItemRequest>) -> AppResult<Vec<RequestDetails>> {
        let mut result = Vec::with_capacity(requests.len());
        for request in requests {
            let items = self.repository.items.find_by_request(request.id).await?;
            result.push(RequestDetails {
                id: request.id,
                description: request.description,
                created: request.created,
                items,
            });
        }
        Ok(result)
    }
}
