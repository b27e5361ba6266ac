//! Content item model and input types.
//!
//! Content items are the central records in Pressroom: authored pages
//! and articles addressed by slug, published on a schedule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum characters of body text included in public stat excerpts.
const EXCERPT_CHARS: usize = 200;

/// Content item record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContentItem {
    /// Unique identifier (UUIDv7). Immutable.
    pub id: Uuid,

    /// Item title. Never empty.
    pub title: String,

    /// URL-safe identifier, unique among all items. Lowercase
    /// letters, digits, and hyphens only.
    pub slug: String,

    /// Body text.
    pub body: String,

    /// Free-form category tag (default: "article").
    pub content_type: String,

    /// Optional description for search/social metadata.
    pub meta_description: Option<String>,

    /// Publication flag. Visibility also requires publish_date <= now.
    pub is_published: bool,

    /// Scheduled publication time. Always set while is_published is true.
    pub publish_date: Option<DateTime<Utc>>,

    /// Author user ID. Nullable: items may be authored anonymously or
    /// outlive their author's account.
    pub author_id: Option<Uuid>,

    /// Set once at creation, never mutated.
    pub created_at: DateTime<Utc>,

    /// Refreshed on every mutation. Always >= created_at.
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// Whether this item is readable by the public at the given instant.
    ///
    /// An item scheduled in the future is published but not yet visible;
    /// "scheduled" is computed at read time, never stored.
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.is_published && self.publish_date.is_some_and(|d| d <= now)
    }

    /// Body excerpt for listings, capped at 200 characters.
    pub fn excerpt(&self) -> String {
        if self.body.chars().count() > EXCERPT_CHARS {
            let cut: String = self.body.chars().take(EXCERPT_CHARS).collect();
            format!("{cut}...")
        } else {
            self.body.clone()
        }
    }
}

/// Input for creating a new content item.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContent {
    pub title: String,
    pub body: String,
    /// Explicit slug candidate. Must already be valid; derived from the
    /// title when absent.
    pub slug: Option<String>,
    pub content_type: Option<String>,
    pub meta_description: Option<String>,
    pub is_published: Option<bool>,
    /// Scheduled publication time. Auto-filled with the current time
    /// when publishing without one.
    pub publish_date: Option<DateTime<Utc>>,
}

/// Input for updating a content item. None fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContent {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub body: Option<String>,
    pub content_type: Option<String>,
    pub meta_description: Option<String>,
    pub is_published: Option<bool>,
    pub publish_date: Option<DateTime<Utc>>,
}

/// Restricted projection returned through the preview path.
///
/// No authorship or audit fields: preview tokens grant access to the
/// content itself, nothing more.
#[derive(Debug, Clone, Serialize)]
pub struct ContentPreview {
    pub title: String,
    pub slug: String,
    pub body: String,
    pub meta_description: Option<String>,
}

impl From<&ContentItem> for ContentPreview {
    fn from(item: &ContentItem) -> Self {
        Self {
            title: item.title.clone(),
            slug: item.slug.clone(),
            body: item.body.clone(),
            meta_description: item.meta_description.clone(),
        }
    }
}

/// Public site statistics.
#[derive(Debug, Clone, Serialize)]
pub struct PublicStats {
    pub total_published: i64,
    pub total_active_users: i64,
    pub recent_published: Vec<RecentContent>,
}

/// Entry in the recent-content portion of public stats.
#[derive(Debug, Clone, Serialize)]
pub struct RecentContent {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub content_type: String,
    pub author_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub meta_description: Option<String>,
}

impl From<&ContentItem> for RecentContent {
    fn from(item: &ContentItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            excerpt: item.excerpt(),
            content_type: item.content_type.clone(),
            author_id: item.author_id,
            created_at: item.created_at,
            meta_description: item.meta_description.clone(),
        }
    }
}
