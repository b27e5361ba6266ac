//! HTTP route handlers.
//!
//! Thin transport over the content services: extract, call, serialize.
//! Authentication is owned by an upstream proxy which forwards the
//! resolved identity in `x-user-id` / `x-user-role` headers.

pub mod content;
pub mod health;
pub mod recommend;
pub mod stats;

use axum::http::HeaderMap;
use uuid::Uuid;

use crate::models::{Requester, Role};

/// Resolve the requester from upstream identity headers.
///
/// Absent or unparseable headers yield an anonymous requester; a role
/// header without an id is ignored, since a role only attaches to an
/// authenticated identity.
pub(crate) fn requester_from_headers(headers: &HeaderMap) -> Requester {
    let id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok());

    let Some(id) = id else {
        return Requester::anonymous();
    };

    let role = headers
        .get("x-user-role")
        .and_then(|v| v.to_str().ok())
        .map(Role::parse)
        .unwrap_or(Role::None);

    Requester::user(id, role)
}
