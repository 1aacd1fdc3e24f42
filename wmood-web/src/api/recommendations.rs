//! Weather-driven recommendations

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use wmood_common::{MoodQuery, Track};

use crate::error::ApiError;
use crate::retrieval::{self, StrategyUsed};
use crate::AppState;

use super::session::require_listener;

#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    pub condition: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub success: bool,
    /// Display label, e.g. "Rainy Chill 🌧️"
    pub mood: &'static str,
    pub description: &'static str,
    pub condition: String,
    pub method: StrategyUsed,
    pub search_term: Option<String>,
    pub tracks: Vec<Track>,
}

/// GET /recommendations?condition=..
pub async fn recommendations(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<RecommendationsQuery>,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    let condition = query
        .condition
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Weather condition is required".to_string()))?;

    let listener = require_listener(&state, &jar).await?;

    let mood_query = MoodQuery::classify(condition.as_str());
    let catalog = state.catalog(&listener.access_token);
    let outcome = retrieval::retrieve_for_mood(&mood_query, &catalog).await?;

    info!(
        condition = %condition,
        method = outcome.strategy_used().as_str(),
        count = outcome.tracks().len(),
        "Recommendations ready"
    );

    let mood = mood_query.mood();
    let method = outcome.strategy_used();
    let search_term = outcome.term_used().map(str::to_string);

    Ok(Json(RecommendationsResponse {
        success: true,
        mood: mood.label(),
        description: mood.description(),
        condition,
        method,
        search_term,
        tracks: outcome.into_tracks(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestMusicResponse {
    pub success: bool,
    pub method: StrategyUsed,
    pub tracks_count: usize,
    pub first_track: String,
}

/// GET /test-music
///
/// Smoke test of the retriever against the listener's account.
pub async fn test_music(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let listener = match require_listener(&state, &jar).await {
        Err(ApiError::Unauthorized(_)) => {
            return Err(ApiError::Unauthorized("Please login first".to_string()))
        }
        other => other?,
    };

    let catalog = state.catalog(&listener.access_token);
    match retrieval::retrieve("sunny", &catalog).await {
        Ok(outcome) => Ok(Json(TestMusicResponse {
            success: true,
            method: outcome.strategy_used(),
            tracks_count: outcome.tracks().len(),
            first_track: outcome
                .tracks()
                .first()
                .map(|t| t.name.clone())
                .unwrap_or_else(|| "No tracks".to_string()),
        })
        .into_response()),
        Err(e) => {
            error!("Test retrieval failed: {}", e);
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response())
        }
    }
}
