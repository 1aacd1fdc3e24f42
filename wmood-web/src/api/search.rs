//! Free-text track search

use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::AppState;

use super::session::require_listener;

pub const SEARCH_LIMIT: u32 = 20;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    /// Spotify track objects as returned by the Web API
    pub tracks: Vec<Value>,
}

/// GET /search?q=..
pub async fn search(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let q = query
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Search query is required".to_string()))?;

    let listener = require_listener(&state, &jar).await?;

    let tracks = state
        .catalog(&listener.access_token)
        .search_raw(&q, SEARCH_LIMIT)
        .await?;

    Ok(Json(SearchResponse {
        success: true,
        query: q,
        tracks,
    }))
}
