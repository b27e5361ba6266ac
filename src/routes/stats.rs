//! Public statistics route handler.

use axum::{Json, Router, extract::State, routing::get};

use crate::error::AppResult;
use crate::models::PublicStats;
use crate::state::AppState;

/// Create the stats router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/stats", get(public_stats))
}

async fn public_stats(State(state): State<AppState>) -> AppResult<Json<PublicStats>> {
    let stats = state.content().stats().await?;
    Ok(Json(stats))
}
