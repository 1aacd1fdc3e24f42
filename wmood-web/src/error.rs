//! HTTP error mapping
//!
//! Every failure leaving a handler becomes a JSON `{"error": message}` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::catalog::CatalogError;
use crate::retrieval::RetrievalError;
use crate::services::{PlaylistError, WeatherError};

/// Shown whenever the recommendation chain comes up empty
pub const NO_MUSIC_MESSAGE: &str =
    "We're having trouble getting music right now. Please try again in a few minutes.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// An upstream service failed or returned something unusable
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_logged_in() -> Self {
        ApiError::Unauthorized("Please login with Spotify first".to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), "{}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<wmood_common::Error> for ApiError {
    fn from(err: wmood_common::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<RetrievalError> for ApiError {
    fn from(err: RetrievalError) -> Self {
        match err {
            RetrievalError::NoResultsFound => ApiError::Internal(NO_MUSIC_MESSAGE.to_string()),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Unauthorized => {
                ApiError::Unauthorized("Spotify session expired, please login again".to_string())
            }
            other => ApiError::Upstream(format!("Spotify request failed: {}", other)),
        }
    }
}

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        match err {
            WeatherError::NotFound(location) => {
                ApiError::NotFound(format!("No weather data for {}", location))
            }
            other => ApiError::Upstream(format!("Weather request failed: {}", other)),
        }
    }
}

impl From<PlaylistError> for ApiError {
    fn from(err: PlaylistError) -> Self {
        match err {
            PlaylistError::MissingName => {
                ApiError::BadRequest("Playlist name and tracks are required".to_string())
            }
            PlaylistError::Profile(e) | PlaylistError::Create(e) | PlaylistError::AddTracks(e) => {
                e.into()
            }
        }
    }
}
