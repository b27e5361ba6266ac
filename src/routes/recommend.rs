//! Recommendation route handler.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::error::AppResult;
use crate::models::ContentItem;
use crate::state::AppState;

/// Create the recommendations router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/recommendations/{slug}", get(get_recommendations))
}

async fn get_recommendations(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Vec<ContentItem>>> {
    let items = state.recommendations().related_to(&slug).await?;
    Ok(Json(items))
}
