//! Preview token store.
//!
//! Capability tokens that grant read access to one specific item
//! regardless of its publication state, so editors can share draft
//! links with reviewers.
//!
//! Tokens live in process memory: they do not survive restart and are
//! not shared across service instances. Acceptable for single-instance
//! deployments only.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::RngCore;
use uuid::Uuid;

/// Bytes of entropy per token.
const TOKEN_BYTES: usize = 32;

/// A token's binding: the item it authorizes and when it lapses.
#[derive(Debug, Clone)]
struct PreviewGrant {
    item_id: Uuid,
    expires_at: DateTime<Utc>,
}

/// Concurrent store of preview tokens, constructed once at startup and
/// injected wherever previews are issued or redeemed.
#[derive(Debug)]
pub struct PreviewTokenStore {
    grants: DashMap<String, PreviewGrant>,
    ttl: Duration,
}

impl PreviewTokenStore {
    /// Create a store whose tokens lapse after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            grants: DashMap::new(),
            ttl,
        }
    }

    /// Issue a new token bound to `item_id`.
    ///
    /// Tokens are independent: issuing does not invalidate earlier
    /// tokens for the same or other items.
    pub fn issue(&self, item_id: Uuid) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);

        self.grants.insert(
            token.clone(),
            PreviewGrant {
                item_id,
                expires_at: Utc::now() + self.ttl,
            },
        );

        token
    }

    /// Check a token against a target item.
    ///
    /// True only when the token exists, has not lapsed, and is bound to
    /// exactly this item. Lapsed tokens are dropped on observation.
    /// Callers must report all failures identically; the reason is
    /// never disclosed.
    pub fn redeem(&self, token: &str, item_id: Uuid) -> bool {
        // Clone out of the guard before any removal below; holding the
        // shard lock across remove() would deadlock.
        let Some(grant) = self.grants.get(token).map(|g| g.value().clone()) else {
            return false;
        };

        if grant.expires_at <= Utc::now() {
            self.grants.remove(token);
            return false;
        }

        grant.item_id == item_id
    }

    /// Drop all lapsed tokens.
    pub fn purge_expired(&self) {
        let now = Utc::now();
        self.grants.retain(|_, grant| grant.expires_at > now);
    }

    /// Number of live grants (lapsed entries included until purged).
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn store() -> PreviewTokenStore {
        PreviewTokenStore::new(Duration::hours(1))
    }

    #[test]
    fn redeem_succeeds_only_for_exact_pair() {
        let store = store();
        let item_id = Uuid::now_v7();
        let token = store.issue(item_id);

        assert!(store.redeem(&token, item_id));
        assert!(!store.redeem(&token, Uuid::now_v7()));
        assert!(!store.redeem("fabricated-token", item_id));
    }

    #[test]
    fn tokens_are_unguessable_length() {
        let store = store();
        let token = store.issue(Uuid::now_v7());
        // 32 bytes of entropy, base64url without padding.
        assert_eq!(token.len(), 43);
    }

    #[test]
    fn concurrent_tokens_are_all_valid() {
        let store = store();
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();

        let t1 = store.issue(a);
        let t2 = store.issue(a);
        let t3 = store.issue(b);

        assert_ne!(t1, t2);
        assert!(store.redeem(&t1, a));
        assert!(store.redeem(&t2, a));
        assert!(store.redeem(&t3, b));
        assert!(!store.redeem(&t3, a));
    }

    #[test]
    fn redeeming_does_not_consume() {
        let store = store();
        let item_id = Uuid::now_v7();
        let token = store.issue(item_id);

        assert!(store.redeem(&token, item_id));
        assert!(store.redeem(&token, item_id));
    }

    #[test]
    fn lapsed_tokens_are_rejected_and_dropped() {
        let store = PreviewTokenStore::new(Duration::zero());
        let item_id = Uuid::now_v7();
        let token = store.issue(item_id);

        assert!(!store.redeem(&token, item_id));
        assert!(store.is_empty());
    }

    #[test]
    fn purge_drops_only_lapsed_grants() {
        let lapsed = PreviewTokenStore::new(Duration::zero());
        lapsed.issue(Uuid::now_v7());
        lapsed.purge_expired();
        assert!(lapsed.is_empty());

        let live = store();
        live.issue(Uuid::now_v7());
        live.purge_expired();
        assert_eq!(live.len(), 1);
    }
}
