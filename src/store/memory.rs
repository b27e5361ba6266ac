//! In-memory content store.
//!
//! Backs tests and single-instance demo deployments. A slug index is
//! maintained alongside the item map, and both are mutated under one
//! write lock so check-and-insert is atomic: concurrent writers racing
//! on the same slug serialize here, and exactly one wins.
//!
//! Uses `parking_lot::RwLock` rather than `std::sync::RwLock` because:
//! - No poisoning: a panic in a writer won't permanently wedge every reader.
//! - Shorter critical sections avoid blocking Tokio worker threads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::models::ContentItem;
use crate::store::{ContentStore, StoreError};

#[derive(Default)]
struct Inner {
    items: HashMap<Uuid, ContentItem>,
    slugs: HashMap<String, Uuid>,
}

/// Content store held entirely in process memory.
#[derive(Default)]
pub struct MemoryContentStore {
    inner: RwLock<Inner>,
    active_users: AtomicI64,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the active-user count reported by public stats. There is no
    /// user storage in this backend; the count is provided externally.
    pub fn set_active_users(&self, count: i64) {
        self.active_users.store(count, Ordering::Relaxed);
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn insert(&self, item: &ContentItem) -> Result<(), StoreError> {
        let mut inner = self.inner.write();

        if inner.slugs.contains_key(&item.slug) {
            return Err(StoreError::SlugConflict);
        }

        inner.slugs.insert(item.slug.clone(), item.id);
        inner.items.insert(item.id, item.clone());
        Ok(())
    }

    async fn update(&self, item: &ContentItem) -> Result<(), StoreError> {
        let mut inner = self.inner.write();

        if let Some(&owner) = inner.slugs.get(&item.slug)
            && owner != item.id
        {
            return Err(StoreError::SlugConflict);
        }

        let Some(previous) = inner.items.get(&item.id).cloned() else {
            return Err(StoreError::Other(anyhow::anyhow!(
                "content item {} vanished during update",
                item.id
            )));
        };

        if previous.slug != item.slug {
            inner.slugs.remove(&previous.slug);
            inner.slugs.insert(item.slug.clone(), item.id);
        }
        inner.items.insert(item.id, item.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write();

        let Some(item) = inner.items.remove(&id) else {
            return Ok(false);
        };
        inner.slugs.remove(&item.slug);
        Ok(true)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError> {
        Ok(self.inner.read().items.get(&id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<ContentItem>, StoreError> {
        let inner = self.inner.read();
        let id = inner.slugs.get(slug);
        Ok(id.and_then(|id| inner.items.get(id)).cloned())
    }

    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, StoreError> {
        let inner = self.inner.read();
        Ok(match inner.slugs.get(slug) {
            Some(&owner) => Some(owner) != exclude,
            None => false,
        })
    }

    async fn list_all(&self) -> Result<Vec<ContentItem>, StoreError> {
        let mut items: Vec<ContentItem> = self.inner.read().items.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn list_visible(&self, now: DateTime<Utc>) -> Result<Vec<ContentItem>, StoreError> {
        let mut items: Vec<ContentItem> = self
            .inner
            .read()
            .items
            .values()
            .filter(|i| i.is_visible_at(now))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
        Ok(items)
    }

    async fn list_for_author(
        &self,
        author_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let mut items: Vec<ContentItem> = self
            .inner
            .read()
            .items
            .values()
            .filter(|i| i.author_id == Some(author_id) || i.is_visible_at(now))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn count_published(&self) -> Result<i64, StoreError> {
        Ok(self
            .inner
            .read()
            .items
            .values()
            .filter(|i| i.is_published)
            .count() as i64)
    }

    async fn count_active_users(&self) -> Result<i64, StoreError> {
        Ok(self.active_users.load(Ordering::Relaxed))
    }

    async fn recent_published(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let mut items = self.list_visible(now).await?;
        items.truncate(limit.max(0) as usize);
        Ok(items)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn item(slug: &str) -> ContentItem {
        let now = Utc::now();
        ContentItem {
            id: Uuid::now_v7(),
            title: "Test".to_string(),
            slug: slug.to_string(),
            body: String::new(),
            content_type: "article".to_string(),
            meta_description: None,
            is_published: false,
            publish_date: None,
            author_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_slug() {
        let store = MemoryContentStore::new();
        store.insert(&item("hello")).await.unwrap();

        let err = store.insert(&item("hello")).await.unwrap_err();
        assert!(matches!(err, StoreError::SlugConflict));
    }

    #[tokio::test]
    async fn update_can_keep_own_slug() {
        let store = MemoryContentStore::new();
        let mut it = item("hello");
        store.insert(&it).await.unwrap();

        it.title = "Changed".to_string();
        store.update(&it).await.unwrap();
        assert_eq!(store.get(it.id).await.unwrap().unwrap().title, "Changed");
    }

    #[tokio::test]
    async fn update_rejects_stealing_slug() {
        let store = MemoryContentStore::new();
        store.insert(&item("taken")).await.unwrap();
        let mut other = item("free");
        store.insert(&other).await.unwrap();

        other.slug = "taken".to_string();
        let err = store.update(&other).await.unwrap_err();
        assert!(matches!(err, StoreError::SlugConflict));
    }

    #[tokio::test]
    async fn slug_rename_releases_old_slug() {
        let store = MemoryContentStore::new();
        let mut it = item("old-slug");
        store.insert(&it).await.unwrap();

        it.slug = "new-slug".to_string();
        store.update(&it).await.unwrap();

        assert!(!store.slug_exists("old-slug", None).await.unwrap());
        assert!(store.slug_exists("new-slug", None).await.unwrap());
        assert!(!store.slug_exists("new-slug", Some(it.id)).await.unwrap());
    }

    #[tokio::test]
    async fn delete_releases_slug() {
        let store = MemoryContentStore::new();
        let it = item("gone");
        store.insert(&it).await.unwrap();

        assert!(store.delete(it.id).await.unwrap());
        assert!(!store.delete(it.id).await.unwrap());
        assert!(!store.slug_exists("gone", None).await.unwrap());
    }
}
