//! Content CRUD and preview route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post, put},
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{ContentItem, ContentPreview, CreateContent, UpdateContent};
use crate::services::ItemSaved;
use crate::state::AppState;

use super::requester_from_headers;

/// Response for preview token issuance.
#[derive(Debug, Serialize)]
struct TokenResponse {
    token: String,
}

/// Create the content router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/content", post(create_content).get(list_content))
        .route(
            "/api/content/{id}",
            put(update_content).get(get_content).delete(delete_content),
        )
        .route("/api/content/slug/{slug}", get(get_content_by_slug))
        .route("/api/content/{id}/preview-token", post(issue_preview_token))
        .route("/api/content/{id}/preview/{token}", get(preview_content))
}

/// Forward a save result to the regeneration pipeline when the saved
/// item is published. Fires on every save of a published item, not only
/// on the draft-to-published transition; `became_published` is there
/// for callers that want to narrow this.
fn notify_if_published(state: &AppState, saved: &ItemSaved) {
    if saved.item.is_published {
        state.notifier().content_published(&saved.item.slug);
    }
}

async fn create_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateContent>,
) -> AppResult<Json<ContentItem>> {
    let requester = requester_from_headers(&headers);

    let saved = state.content().create(input, &requester).await?;
    notify_if_published(&state, &saved);

    Ok(Json(saved.item))
}

async fn update_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateContent>,
) -> AppResult<Json<ContentItem>> {
    let requester = requester_from_headers(&headers);

    let saved = state.content().update(id, input, &requester).await?;
    notify_if_published(&state, &saved);

    Ok(Json(saved.item))
}

async fn delete_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let requester = requester_from_headers(&headers);

    state.content().delete(id, &requester).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

async fn get_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ContentItem>> {
    let requester = requester_from_headers(&headers);
    let item = state.content().get(id, &requester).await?;
    Ok(Json(item))
}

async fn get_content_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ContentItem>> {
    let item = state.content().get_by_slug(&slug).await?;
    Ok(Json(item))
}

async fn list_content(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<ContentItem>>> {
    let requester = requester_from_headers(&headers);
    let items = state.content().list(&requester).await?;
    Ok(Json(items))
}

async fn issue_preview_token(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .content()
        .issue_preview_token(id, state.previews())
        .await?;
    Ok(Json(TokenResponse { token }))
}

async fn preview_content(
    State(state): State<AppState>,
    Path((id, token)): Path<(Uuid, String)>,
) -> AppResult<Json<ContentPreview>> {
    let preview = state.content().preview(id, &token, state.previews()).await?;
    Ok(Json(preview))
}
