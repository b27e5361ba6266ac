//! Recommendation matching.
//!
//! Relates content items by shared title vocabulary: a visible item is
//! recommended for a source item when their lowercased titles share at
//! least one whitespace-delimited word.
//!
//! This is a linear scan over visible items per request, fine at the
//! current scale. Callers only see [`RecommendationMatcher::related_to`],
//! so an indexed similarity structure can replace the scan later
//! without touching them.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use crate::error::AppError;
use crate::models::ContentItem;
use crate::store::ContentStore;

/// Maximum number of recommendations returned.
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Matches related content by shared title words.
#[derive(Clone)]
pub struct RecommendationMatcher {
    store: Arc<dyn ContentStore>,
}

impl RecommendationMatcher {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Return up to 5 visible items sharing a title word with the item
    /// at `slug`, most recently published first.
    ///
    /// An unknown slug yields an empty result, not an error: the public
    /// site calls this speculatively for any path.
    pub async fn related_to(&self, slug: &str) -> Result<Vec<ContentItem>, AppError> {
        let Some(source) = self.store.get_by_slug(slug).await? else {
            return Ok(Vec::new());
        };

        let source_words = title_words(&source.title);
        let mut related = Vec::new();

        // list_visible is ordered by publish_date descending, which
        // makes the cut deterministic: the 5 most recent matches win.
        for item in self.store.list_visible(Utc::now()).await? {
            if item.id == source.id {
                continue;
            }
            if title_words(&item.title)
                .intersection(&source_words)
                .next()
                .is_some()
            {
                related.push(item);
                if related.len() == MAX_RECOMMENDATIONS {
                    break;
                }
            }
        }

        Ok(related)
    }
}

/// Lowercased whitespace-delimited words of a title.
fn title_words(title: &str) -> HashSet<String> {
    title
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
