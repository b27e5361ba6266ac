//! Slug derivation and unique allocation.
//!
//! Slugs identify content items in URLs: lowercase letters, digits,
//! and hyphens, unique across all items. Derived from the title unless
//! an explicit candidate is supplied.

use uuid::Uuid;

use crate::store::{ContentStore, StoreError};

/// Numeric suffixes tried before falling back to a UUID fragment.
const MAX_SUFFIX: u32 = 100;

/// Convert text into a URL-safe slug.
///
/// Transforms to lowercase, replaces non-alphanumeric characters with hyphens,
/// collapses consecutive hyphens, and trims leading/trailing hyphens.
pub fn slugify(text: &str) -> String {
    let slug: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();

    // Collapse consecutive hyphens and trim
    let mut result = String::with_capacity(slug.len());
    let mut prev_was_hyphen = true; // Start true to skip leading hyphens
    for c in slug.chars() {
        if c == '-' {
            if !prev_was_hyphen {
                result.push('-');
            }
            prev_was_hyphen = true;
        } else {
            result.push(c);
            prev_was_hyphen = false;
        }
    }

    // Trim trailing hyphen
    while result.ends_with('-') {
        result.pop();
    }

    // Truncate to reasonable length
    if result.len() > 128 {
        // result is pure ASCII (alphanumerics + hyphens from the char
        // map above), so slicing at 128 is safe.
        let truncated = &result[..128];
        // Find a clean break point (don't cut in middle of word)
        if let Some(last_hyphen) = truncated.rfind('-') {
            return truncated[..last_hyphen].to_string();
        }
        return truncated.to_string();
    }

    result
}

/// Check that a slug contains only lowercase letters, digits, and
/// hyphens, and is non-empty.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Allocate a slug unique among all items other than `exclude`.
///
/// Tries `base` first, then `base-1`, `base-2`, … and finally a UUID
/// fragment for guaranteed uniqueness. An empty base (e.g. a title with
/// no alphanumeric characters) falls back to a fragment of the item's
/// own id, since an empty slug is disallowed.
///
/// Uniqueness observed here can be stale by the time the caller writes;
/// the store enforces the invariant at the write boundary and the
/// caller retries allocation on conflict.
pub async fn allocate(
    store: &dyn ContentStore,
    base: &str,
    item_id: Uuid,
    exclude: Option<Uuid>,
) -> Result<String, StoreError> {
    let base = if base.is_empty() {
        id_fragment(item_id)
    } else {
        base.to_string()
    };

    if !store.slug_exists(&base, exclude).await? {
        return Ok(base);
    }

    for i in 1..MAX_SUFFIX {
        let candidate = format!("{base}-{i}");
        if !store.slug_exists(&candidate, exclude).await? {
            return Ok(candidate);
        }
    }

    // Fallback: append UUID fragment for guaranteed uniqueness
    let fragment = &Uuid::now_v7().to_string()[..8];
    Ok(format!("{base}-{fragment}"))
}

fn id_fragment(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}
