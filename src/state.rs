//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::Result;
use chrono::Duration;
use sqlx::PgPool;

use crate::config::{Config, StorageBackend};
use crate::db;
use crate::services::{
    ContentService, PreviewTokenStore, RecommendationMatcher, RegenerationNotifier,
};
use crate::store::{ContentStore, MemoryContentStore, PgContentStore};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL pool, present only with the postgres backend.
    db: Option<PgPool>,

    /// Content item service.
    content: ContentService,

    /// Preview token store. Lives and dies with the process.
    previews: PreviewTokenStore,

    /// Recommendation matcher.
    recommendations: RecommendationMatcher,

    /// Regeneration event sender.
    notifier: RegenerationNotifier,
}

impl AppState {
    /// Initialize application state from configuration.
    pub async fn new(config: &Config) -> Result<Self> {
        let (store, db): (Arc<dyn ContentStore>, Option<PgPool>) = match config.storage {
            StorageBackend::Postgres => {
                let pool = db::create_pool(config).await?;
                (Arc::new(PgContentStore::new(pool.clone())), Some(pool))
            }
            StorageBackend::Memory => (Arc::new(MemoryContentStore::new()), None),
        };

        let notifier = RegenerationNotifier::new(
            config.regen_endpoint.clone(),
            config.regen_secret.clone(),
        );

        Ok(Self::assemble(
            store,
            db,
            notifier,
            Duration::seconds(config.preview_token_ttl_secs),
        ))
    }

    /// Build state around an existing store, with notification
    /// disabled. Used by tests and embedded setups.
    pub fn with_store(store: Arc<dyn ContentStore>) -> Self {
        Self::assemble(
            store,
            None,
            RegenerationNotifier::disabled(),
            Duration::hours(1),
        )
    }

    fn assemble(
        store: Arc<dyn ContentStore>,
        db: Option<PgPool>,
        notifier: RegenerationNotifier,
        preview_ttl: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                db,
                content: ContentService::new(store.clone()),
                previews: PreviewTokenStore::new(preview_ttl),
                recommendations: RecommendationMatcher::new(store),
                notifier,
            }),
        }
    }

    pub fn content(&self) -> &ContentService {
        &self.inner.content
    }

    pub fn previews(&self) -> &PreviewTokenStore {
        &self.inner.previews
    }

    pub fn recommendations(&self) -> &RecommendationMatcher {
        &self.inner.recommendations
    }

    pub fn notifier(&self) -> &RegenerationNotifier {
        &self.inner.notifier
    }

    /// Whether the storage backend is reachable. Always true for the
    /// in-memory backend.
    pub async fn storage_healthy(&self) -> bool {
        match &self.inner.db {
            Some(pool) => db::check_health(pool).await,
            None => true,
        }
    }
}
