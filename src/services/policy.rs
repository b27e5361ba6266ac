//! Publication policy: save-time validation, the visibility predicate,
//! and authorization rules.
//!
//! "Scheduled but not yet visible" is computed per read from wall-clock
//! time; no stored state transitions on its own.

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::{ContentItem, Requester, Role};
use crate::services::slug::is_valid_slug;

/// Validate and normalize publish-related fields before persistence.
///
/// Publishing without a publish date fills in the current time. The
/// rule applies on create and update alike, so the same field
/// combination can never be rejected on one path and accepted on
/// another.
pub fn validate_for_save(item: &mut ContentItem, now: DateTime<Utc>) -> Result<(), AppError> {
    if item.title.trim().is_empty() {
        return Err(AppError::validation("title", "title must not be empty"));
    }

    if !is_valid_slug(&item.slug) {
        return Err(AppError::validation(
            "slug",
            "slug must be lowercase, alphanumeric, and hyphenated only",
        ));
    }

    if item.is_published && item.publish_date.is_none() {
        item.publish_date = Some(now);
    }

    Ok(())
}

/// Whether an item is readable through governed (authenticated) reads.
///
/// Staff read everything; authors read their own items; everyone reads
/// what is publicly visible.
pub fn can_view(item: &ContentItem, requester: &Requester, now: DateTime<Utc>) -> bool {
    match requester.role {
        Role::Admin | Role::Editor => true,
        Role::Author | Role::None => {
            (requester.id.is_some() && requester.id == item.author_id)
                || item.is_visible_at(now)
        }
    }
}

/// Whether a requester may create content. Any authenticated requester may.
pub fn can_create(requester: &Requester) -> bool {
    requester.is_authenticated()
}

/// Whether a requester may update or delete an item: its author, or a
/// requester holding a content-management role.
pub fn can_mutate(item: &ContentItem, requester: &Requester) -> bool {
    match requester.role {
        Role::Admin | Role::Editor => true,
        Role::Author | Role::None => {
            requester.id.is_some() && requester.id == item.author_id
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn item(author_id: Option<Uuid>) -> ContentItem {
        let now = Utc::now();
        ContentItem {
            id: Uuid::now_v7(),
            title: "A Title".to_string(),
            slug: "a-title".to_string(),
            body: String::new(),
            content_type: "article".to_string(),
            meta_description: None,
            is_published: false,
            publish_date: None,
            author_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn publishing_without_date_fills_current_time() {
        let now = Utc::now();
        let mut it = item(None);
        it.is_published = true;

        validate_for_save(&mut it, now).unwrap();
        assert_eq!(it.publish_date, Some(now));
    }

    #[test]
    fn existing_publish_date_is_preserved() {
        let now = Utc::now();
        let scheduled = now + Duration::hours(3);
        let mut it = item(None);
        it.is_published = true;
        it.publish_date = Some(scheduled);

        validate_for_save(&mut it, now).unwrap();
        assert_eq!(it.publish_date, Some(scheduled));
    }

    #[test]
    fn empty_title_is_rejected() {
        let mut it = item(None);
        it.title = "   ".to_string();
        let err = validate_for_save(&mut it, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "title", .. }));
    }

    #[test]
    fn malformed_slug_is_rejected() {
        let mut it = item(None);
        it.slug = "Bad Slug!".to_string();
        let err = validate_for_save(&mut it, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "slug", .. }));
    }

    #[test]
    fn staff_view_everything() {
        let now = Utc::now();
        let draft = item(Some(Uuid::now_v7()));
        assert!(can_view(&draft, &Requester::user(Uuid::now_v7(), Role::Admin), now));
        assert!(can_view(&draft, &Requester::user(Uuid::now_v7(), Role::Editor), now));
    }

    #[test]
    fn author_views_own_draft_only() {
        let now = Utc::now();
        let author = Uuid::now_v7();
        let draft = item(Some(author));

        assert!(can_view(&draft, &Requester::user(author, Role::Author), now));
        assert!(!can_view(&draft, &Requester::user(Uuid::now_v7(), Role::Author), now));
        assert!(!can_view(&draft, &Requester::anonymous(), now));
    }

    #[test]
    fn anonymous_views_visible_items() {
        let now = Utc::now();
        let mut it = item(Some(Uuid::now_v7()));
        it.is_published = true;
        it.publish_date = Some(now - Duration::hours(1));

        assert!(can_view(&it, &Requester::anonymous(), now));
    }

    #[test]
    fn anonymous_author_id_never_grants_access() {
        // An item with no author must not be mutable or viewable just
        // because the requester also has no id.
        let now = Utc::now();
        let orphan = item(None);

        assert!(!can_view(&orphan, &Requester::anonymous(), now));
        assert!(!can_mutate(&orphan, &Requester::anonymous()));
    }

    #[test]
    fn mutation_requires_author_or_staff() {
        let author = Uuid::now_v7();
        let it = item(Some(author));

        assert!(can_mutate(&it, &Requester::user(author, Role::Author)));
        assert!(can_mutate(&it, &Requester::user(Uuid::now_v7(), Role::Editor)));
        assert!(can_mutate(&it, &Requester::user(Uuid::now_v7(), Role::Admin)));
        assert!(!can_mutate(&it, &Requester::user(Uuid::now_v7(), Role::Author)));
        assert!(!can_mutate(&it, &Requester::anonymous()));
    }

    #[test]
    fn creation_requires_authentication() {
        assert!(can_create(&Requester::user(Uuid::now_v7(), Role::Author)));
        assert!(can_create(&Requester::user(Uuid::now_v7(), Role::None)));
        assert!(!can_create(&Requester::anonymous()));
    }
}
