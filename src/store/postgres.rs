//! Postgres-backed content store.
//!
//! Slug uniqueness is enforced by the `content_item_slug_key` unique
//! constraint; violations surface as [`StoreError::SlugConflict`] so
//! the allocation loop in the content service can retry.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::ContentItem;
use crate::store::{ContentStore, StoreError};

const ITEM_COLUMNS: &str = "id, title, slug, body, content_type, meta_description, \
     is_published, publish_date, author_id, created_at, updated_at";

/// Content store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a sqlx error, turning unique violations into slug conflicts.
///
/// The slug constraint is the only non-key unique constraint on the
/// table, so any unique violation on write is a slug collision.
fn map_write_error(err: sqlx::Error, action: &'static str) -> StoreError {
    if let sqlx::Error::Database(db) = &err
        && db.is_unique_violation()
    {
        return StoreError::SlugConflict;
    }
    StoreError::Other(anyhow::Error::new(err).context(action))
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn insert(&self, item: &ContentItem) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO content_item
                (id, title, slug, body, content_type, meta_description,
                 is_published, publish_date, author_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(item.id)
        .bind(&item.title)
        .bind(&item.slug)
        .bind(&item.body)
        .bind(&item.content_type)
        .bind(&item.meta_description)
        .bind(item.is_published)
        .bind(item.publish_date)
        .bind(item.author_id)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "failed to insert content item"))?;

        Ok(())
    }

    async fn update(&self, item: &ContentItem) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE content_item
            SET title = $2, slug = $3, body = $4, content_type = $5,
                meta_description = $6, is_published = $7, publish_date = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(item.id)
        .bind(&item.title)
        .bind(&item.slug)
        .bind(&item.body)
        .bind(&item.content_type)
        .bind(&item.meta_description)
        .bind(item.is_published)
        .bind(item.publish_date)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "failed to update content item"))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Other(anyhow::anyhow!(
                "content item {} vanished during update",
                item.id
            )));
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM content_item WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("failed to delete content item")?;

        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError> {
        let item = sqlx::query_as::<_, ContentItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM content_item WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch content item by id")?;

        Ok(item)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<ContentItem>, StoreError> {
        let item = sqlx::query_as::<_, ContentItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM content_item WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch content item by slug")?;

        Ok(item)
    }

    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM content_item WHERE slug = $1 AND id IS DISTINCT FROM $2)",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .context("failed to check slug existence")?;

        Ok(exists)
    }

    async fn list_all(&self) -> Result<Vec<ContentItem>, StoreError> {
        let items = sqlx::query_as::<_, ContentItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM content_item ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .context("failed to list content items")?;

        Ok(items)
    }

    async fn list_visible(&self, now: DateTime<Utc>) -> Result<Vec<ContentItem>, StoreError> {
        let items = sqlx::query_as::<_, ContentItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM content_item \
             WHERE is_published AND publish_date <= $1 \
             ORDER BY publish_date DESC"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .context("failed to list visible content items")?;

        Ok(items)
    }

    async fn list_for_author(
        &self,
        author_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let items = sqlx::query_as::<_, ContentItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM content_item \
             WHERE author_id = $1 OR (is_published AND publish_date <= $2) \
             ORDER BY created_at DESC"
        ))
        .bind(author_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .context("failed to list content items for author")?;

        Ok(items)
    }

    async fn count_published(&self) -> Result<i64, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM content_item WHERE is_published")
                .fetch_one(&self.pool)
                .await
                .context("failed to count published items")?;

        Ok(count)
    }

    async fn count_active_users(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM app_user WHERE is_active")
            .fetch_one(&self.pool)
            .await
            .context("failed to count active users")?;

        Ok(count)
    }

    async fn recent_published(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let items = sqlx::query_as::<_, ContentItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM content_item \
             WHERE is_published AND publish_date <= $1 \
             ORDER BY publish_date DESC LIMIT $2"
        ))
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("failed to list recent published items")?;

        Ok(items)
    }
}
