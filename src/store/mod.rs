//! Content storage.
//!
//! All persistence goes through the [`ContentStore`] trait so the core
//! services stay independent of the backing engine. Two implementations:
//! Postgres for durable deployments, and an in-memory store for tests
//! and single-instance demos.

mod memory;
mod postgres;

pub use memory::MemoryContentStore;
pub use postgres::PgContentStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::ContentItem;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another item already holds the slug being written. The slug
    /// uniqueness invariant is enforced here, at the storage boundary,
    /// so concurrent writers racing on the same slug cannot both win;
    /// the loser re-allocates and retries.
    #[error("slug already in use")]
    SlugConflict,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Storage interface for content items.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Insert a new item. Fails with [`StoreError::SlugConflict`] if the
    /// slug is already taken.
    async fn insert(&self, item: &ContentItem) -> Result<(), StoreError>;

    /// Persist all mutable fields of an existing item. Fails with
    /// [`StoreError::SlugConflict`] if the slug was changed to one
    /// another item holds.
    async fn update(&self, item: &ContentItem) -> Result<(), StoreError>;

    /// Remove an item. Returns false if it did not exist.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<ContentItem>, StoreError>;

    /// Whether any item other than `exclude` holds this slug.
    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, StoreError>;

    /// All items, newest first.
    async fn list_all(&self) -> Result<Vec<ContentItem>, StoreError>;

    /// Publicly visible items (published with publish_date <= now),
    /// most recently published first.
    async fn list_visible(&self, now: DateTime<Utc>) -> Result<Vec<ContentItem>, StoreError>;

    /// Items visible to an authenticated non-staff requester: their own
    /// items plus everything publicly visible. Newest first.
    async fn list_for_author(
        &self,
        author_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<ContentItem>, StoreError>;

    /// Count of items with the published flag set, regardless of
    /// scheduled time.
    async fn count_published(&self) -> Result<i64, StoreError>;

    /// Count of active user accounts.
    async fn count_active_users(&self) -> Result<i64, StoreError>;

    /// Most recently published visible items, up to `limit`.
    async fn recent_published(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ContentItem>, StoreError>;
}
