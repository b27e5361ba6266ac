//! Content service: create, update, read, list, delete, preview, and
//! public stats, with slug allocation and publication policy applied on
//! every write.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    ContentItem, ContentPreview, CreateContent, PublicStats, RecentContent, Requester,
    UpdateContent,
};
use crate::services::preview::PreviewTokenStore;
use crate::services::{policy, slug};
use crate::store::{ContentStore, StoreError};

/// Write attempts before giving up on slug contention. Each retry
/// re-allocates against the then-current slug set, so a failing attempt
/// means another writer claimed the candidate in the window between
/// allocation and write.
const MAX_WRITE_ATTEMPTS: usize = 10;

/// Recent items included in public stats.
const RECENT_LIMIT: i64 = 6;

/// Result of a successful save.
///
/// Publication is reported as an explicit event rather than a hidden
/// persistence hook: the calling layer decides whether to forward it to
/// the regeneration pipeline.
#[derive(Debug, Clone)]
pub struct ItemSaved {
    pub item: ContentItem,
    /// True when this save transitioned the item from draft to published.
    pub became_published: bool,
}

/// Service for content item operations.
#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn ContentStore>,
}

impl ContentService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Create a content item. Any authenticated requester may create;
    /// the item is attributed to them.
    pub async fn create(
        &self,
        input: CreateContent,
        requester: &Requester,
    ) -> Result<ItemSaved, AppError> {
        if !policy::can_create(requester) {
            return Err(AppError::Forbidden);
        }

        let base = match &input.slug {
            Some(candidate) => {
                if !slug::is_valid_slug(candidate) {
                    return Err(AppError::validation(
                        "slug",
                        "slug must be lowercase, alphanumeric, and hyphenated only",
                    ));
                }
                candidate.clone()
            }
            None => slug::slugify(&input.title),
        };

        let now = Utc::now();
        let mut item = ContentItem {
            id: Uuid::now_v7(),
            title: input.title.trim().to_string(),
            slug: String::new(),
            body: input.body,
            content_type: input.content_type.unwrap_or_else(|| "article".to_string()),
            meta_description: input.meta_description,
            is_published: input.is_published.unwrap_or(false),
            publish_date: input.publish_date,
            author_id: requester.id,
            created_at: now,
            updated_at: now,
        };

        for _ in 0..MAX_WRITE_ATTEMPTS {
            item.slug = slug::allocate(self.store.as_ref(), &base, item.id, None).await?;
            policy::validate_for_save(&mut item, now)?;

            match self.store.insert(&item).await {
                Ok(()) => {
                    info!(item_id = %item.id, slug = %item.slug, "content item created");
                    return Ok(ItemSaved {
                        became_published: item.is_published,
                        item,
                    });
                }
                // Lost the allocation race; re-allocate against the
                // winner's slug and try again.
                Err(StoreError::SlugConflict) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Internal(anyhow::anyhow!(
            "slug allocation contention exceeded {MAX_WRITE_ATTEMPTS} attempts"
        )))
    }

    /// Update a content item. Unknown ids surface as a typed NotFound,
    /// never as an empty success.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateContent,
        requester: &Requester,
    ) -> Result<ItemSaved, AppError> {
        let Some(existing) = self.store.get(id).await? else {
            return Err(AppError::NotFound);
        };

        if !policy::can_mutate(&existing, requester) {
            return Err(AppError::Forbidden);
        }

        let was_published = existing.is_published;
        let mut item = existing.clone();

        if let Some(title) = input.title {
            item.title = title.trim().to_string();
        }
        if let Some(body) = input.body {
            item.body = body;
        }
        if let Some(content_type) = input.content_type {
            item.content_type = content_type;
        }
        if let Some(meta_description) = input.meta_description {
            item.meta_description = Some(meta_description);
        }
        if let Some(is_published) = input.is_published {
            item.is_published = is_published;
        }
        if let Some(publish_date) = input.publish_date {
            item.publish_date = Some(publish_date);
        }

        // The slug is stable across renames; it changes only on an
        // explicit request.
        let slug_base = match &input.slug {
            Some(candidate) if *candidate != existing.slug => {
                if !slug::is_valid_slug(candidate) {
                    return Err(AppError::validation(
                        "slug",
                        "slug must be lowercase, alphanumeric, and hyphenated only",
                    ));
                }
                Some(candidate.clone())
            }
            _ => None,
        };

        let now = Utc::now();
        item.updated_at = now;
        policy::validate_for_save(&mut item, now)?;

        let became_published = !was_published && item.is_published;

        let Some(base) = slug_base else {
            self.store.update(&item).await?;
            info!(item_id = %id, "content item updated");
            return Ok(ItemSaved {
                item,
                became_published,
            });
        };

        for _ in 0..MAX_WRITE_ATTEMPTS {
            item.slug = slug::allocate(self.store.as_ref(), &base, id, Some(id)).await?;
            match self.store.update(&item).await {
                Ok(()) => {
                    info!(item_id = %id, slug = %item.slug, "content item updated");
                    return Ok(ItemSaved {
                        item,
                        became_published,
                    });
                }
                Err(StoreError::SlugConflict) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Internal(anyhow::anyhow!(
            "slug allocation contention exceeded {MAX_WRITE_ATTEMPTS} attempts"
        )))
    }

    /// Delete a content item. Same authorization rule as update.
    pub async fn delete(&self, id: Uuid, requester: &Requester) -> Result<(), AppError> {
        let Some(existing) = self.store.get(id).await? else {
            return Err(AppError::NotFound);
        };

        if !policy::can_mutate(&existing, requester) {
            return Err(AppError::Forbidden);
        }

        if !self.store.delete(id).await? {
            return Err(AppError::NotFound);
        }

        info!(item_id = %id, "content item deleted");
        Ok(())
    }

    /// Governed read by id: staff and authors see drafts, everyone sees
    /// visible items.
    pub async fn get(&self, id: Uuid, requester: &Requester) -> Result<ContentItem, AppError> {
        let Some(item) = self.store.get(id).await? else {
            return Err(AppError::NotFound);
        };

        if !policy::can_view(&item, requester, Utc::now()) {
            return Err(AppError::Forbidden);
        }

        Ok(item)
    }

    /// Public read by slug. Items that exist but are not visible are
    /// indistinguishable from items that do not exist.
    pub async fn get_by_slug(&self, slug: &str) -> Result<ContentItem, AppError> {
        let item = self.store.get_by_slug(slug).await?;

        match item {
            Some(item) if item.is_visible_at(Utc::now()) => Ok(item),
            _ => Err(AppError::NotFound),
        }
    }

    /// List items for a requester: staff see everything, authenticated
    /// requesters see their own items plus visible ones, anonymous
    /// requesters see only visible items.
    pub async fn list(&self, requester: &Requester) -> Result<Vec<ContentItem>, AppError> {
        let now = Utc::now();

        let items = if requester.is_staff() {
            self.store.list_all().await?
        } else if let Some(author_id) = requester.id {
            self.store.list_for_author(author_id, now).await?
        } else {
            self.store.list_visible(now).await?
        };

        Ok(items)
    }

    /// Issue a preview token for an item. The item must exist; its
    /// publication state is irrelevant.
    pub async fn issue_preview_token(
        &self,
        id: Uuid,
        tokens: &PreviewTokenStore,
    ) -> Result<String, AppError> {
        if self.store.get(id).await?.is_none() {
            return Err(AppError::NotFound);
        }

        Ok(tokens.issue(id))
    }

    /// Redeem a preview token for its restricted projection.
    ///
    /// Every failure is the same opaque Forbidden: whether the token is
    /// unknown, lapsed, bound to a different item, or the item is gone.
    pub async fn preview(
        &self,
        id: Uuid,
        token: &str,
        tokens: &PreviewTokenStore,
    ) -> Result<ContentPreview, AppError> {
        if !tokens.redeem(token, id) {
            return Err(AppError::Forbidden);
        }

        let Some(item) = self.store.get(id).await? else {
            return Err(AppError::Forbidden);
        };

        Ok(ContentPreview::from(&item))
    }

    /// Public site statistics.
    pub async fn stats(&self) -> Result<PublicStats, AppError> {
        let now = Utc::now();

        let total_published = self.store.count_published().await?;
        let total_active_users = self.store.count_active_users().await?;
        let recent = self.store.recent_published(now, RECENT_LIMIT).await?;

        Ok(PublicStats {
            total_published,
            total_active_users,
            recent_published: recent.iter().map(RecentContent::from).collect(),
        })
    }
}
