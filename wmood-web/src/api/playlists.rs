//! Save recommendations as a Spotify playlist

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::services::{create_weather_playlist, PlaylistRequest};
use crate::AppState;

use super::session::require_listener;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistBody {
    pub playlist_name: Option<String>,
    pub description: Option<String>,
    pub track_uris: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub track_count: usize,
}

#[derive(Debug, Serialize)]
pub struct CreatePlaylistResponse {
    pub success: bool,
    pub playlist: PlaylistSummary,
    pub message: String,
}

/// POST /create-playlist
pub async fn create_playlist(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<CreatePlaylistBody>,
) -> Result<Json<CreatePlaylistResponse>, ApiError> {
    let listener = require_listener(&state, &jar).await?;

    let (Some(name), Some(track_uris)) = (body.playlist_name, body.track_uris) else {
        return Err(ApiError::BadRequest(
            "Playlist name and tracks are required".to_string(),
        ));
    };

    let request = PlaylistRequest {
        name,
        description: body.description,
        track_uris,
        public: body.is_public != Some(false),
    };

    let created = create_weather_playlist(&state.catalog(&listener.access_token), request).await?;

    Ok(Json(CreatePlaylistResponse {
        success: true,
        playlist: PlaylistSummary {
            id: created.id,
            name: created.name,
            url: created.url,
            track_count: created.track_count,
        },
        message: "Playlist created successfully! 🎉".to_string(),
    }))
}
