//! Playlist creation from a recommended track set

use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::spotify::{NewPlaylist, SpotifyCatalog};
use crate::catalog::CatalogError;

/// Spotify accepts at most this many URIs per add-tracks call
pub const MAX_URIS_PER_REQUEST: usize = 100;

pub const DEFAULT_DESCRIPTION: &str = "Created with WeatherMood 🎵";

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("Playlist name is required")]
    MissingName,

    #[error("Could not read listener profile: {0}")]
    Profile(#[source] CatalogError),

    #[error("Could not create playlist: {0}")]
    Create(#[source] CatalogError),

    #[error("Could not add tracks to playlist: {0}")]
    AddTracks(#[source] CatalogError),
}

/// What the listener asked for
#[derive(Debug, Clone)]
pub struct PlaylistRequest {
    pub name: String,
    pub description: Option<String>,
    pub track_uris: Vec<String>,
    pub public: bool,
}

/// Playlist as reported back to the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPlaylist {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub track_count: usize,
}

/// Create a playlist in the listener's account and fill it
///
/// Tracks are appended in batches of [`MAX_URIS_PER_REQUEST`], in order. An
/// empty track list leaves the playlist empty.
pub async fn create_weather_playlist(
    catalog: &SpotifyCatalog,
    request: PlaylistRequest,
) -> Result<CreatedPlaylist, PlaylistError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(PlaylistError::MissingName);
    }

    let user = catalog.current_user().await.map_err(PlaylistError::Profile)?;

    let new_playlist = NewPlaylist {
        name: name.to_string(),
        description: request
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        public: request.public,
    };

    let playlist = catalog
        .create_playlist(&user.id, &new_playlist)
        .await
        .map_err(PlaylistError::Create)?;

    for (index, batch) in request.track_uris.chunks(MAX_URIS_PER_REQUEST).enumerate() {
        debug!(playlist_id = %playlist.id, batch = index, size = batch.len(), "Adding tracks");
        catalog
            .add_tracks_to_playlist(&playlist.id, batch)
            .await
            .map_err(PlaylistError::AddTracks)?;
    }

    info!(
        playlist_id = %playlist.id,
        tracks = request.track_uris.len(),
        "Created playlist '{}'",
        new_playlist.name
    );

    Ok(CreatedPlaylist {
        id: playlist.id,
        name: new_playlist.name,
        url: playlist.external_urls.spotify,
        track_count: request.track_uris.len(),
    })
}
