//! Item management service

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        comment::{CommentView, CreateComment},
        item::{CreateItem, Item, ItemDetails, UpdateItem},
    },
    repository::Repository,
};

use super::bookings::BookingsService;

#[derive(Clone)]
pub struct ItemsService {
    repository: Repository,
    bookings: BookingsService,
}

impl ItemsService {
    pub fn new(repository: Repository, bookings: BookingsService) -> Self {
        Self { repository, bookings }
    }

    /// List a new item for lending
    pub async fn create(&self, owner_id: i32, item: CreateItem) -> AppResult<Item> {
        if !self.repository.users.exists(owner_id).await? {
            return Err(AppError::NotFound(format!("User with id {} not found", owner_id)));
        }
        if let Some(request_id) = item.request_id {
            // Answering a wishlist request requires the request to exist
            self.repository.requests.get_by_id(request_id).await?;
        }
        let created = self.repository.items.create(owner_id, &item).await?;
        tracing::info!("User {} listed item {}", owner_id, created.id);
        Ok(created)
    }

    /// Update an item; only its owner may do so
    pub async fn update(&self, caller_id: i32, item_id: i32, update: UpdateItem) -> AppResult<Item> {
        let item = self.repository.items.get_by_id(item_id).await?;
        if item.owner_id != caller_id {
            return Err(AppError::Authorization("not item owner".to_string()));
        }
        self.repository.items.update(item_id, &update).await
    }

    /// Get one item with comments; booking context only for the owner
    pub async fn get_details(&self, caller_id: i32, item_id: i32) -> AppResult<ItemDetails> {
        let item = self.repository.items.get_by_id(item_id).await?;
        self.details_for(item, caller_id).await
    }

    /// The caller's own items with booking context and comments
    pub async fn list_own(&self, owner_id: i32) -> AppResult<Vec<ItemDetails>> {
        if !self.repository.users.exists(owner_id).await? {
            return Err(AppError::NotFound(format!("User with id {} not found", owner_id)));
        }
        let items = self.repository.items.list_by_owner(owner_id).await?;
        let mut result = Vec::with_capacity(items.len());
        for item in items {
            result.push(self.details_for(item, owner_id).await?);
        }
        Ok(result)
    }

    /// Search available items; blank text matches nothing
    pub async fn search(&self, text: &str) -> AppResult<Vec<Item>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.repository.items.search(text).await
    }

    /// Attach a comment to an item the author has previously rented
    pub async fn add_comment(
        &self,
        author_id: i32,
        item_id: i32,
        comment: CreateComment,
    ) -> AppResult<CommentView> {
        self.bookings.ensure_can_comment(author_id, item_id).await?;

        let author = self.repository.users.get_by_id(author_id).await?;
        let created = self
            .repository
            .comments
            .create(item_id, author_id, &comment.text)
            .await?;

        Ok(CommentView {
            id: created.id,
            text: created.text,
            author_name: author.name,
            created: created.created,
        })
    }

    async fn details_for(&self, item: Item, caller_id: i32) -> AppResult<ItemDetails> {
        let comments = self.repository.comments.find_by_item(item.id).await?;

        // Booking context is owner-only
        let (last_booking, next_booking) = if item.owner_id == caller_id {
            let now = Utc::now();
            (
                self.repository.bookings.last_for_item(item.id, now).await?,
                self.repository.bookings.next_for_item(item.id, now).await?,
            )
        } else {
            (None, None)
        };

        Ok(ItemDetails {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            request_id: item.request_id,
            last_booking,
            next_booking,
            comments,
        })
    }
}
