//! Spotify Web API client
//!
//! Bound to one listener's bearer token. Implements [`CatalogCapability`] for
//! the retriever and exposes the few write/profile calls the playlist and
//! account routes need.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use wmood_common::{CollectionRef, TimeRange, Track};

use super::{CatalogCapability, CatalogError};

pub const SPOTIFY_API_BASE_URL: &str = "https://api.spotify.com/v1";
const MARKET: &str = "US";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct Paging<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    tracks: Paging<T>,
}

/// Saved-track and playlist-track entries wrap the track; local files and
/// removed tracks come back as `null`.
#[derive(Debug, Deserialize)]
struct TrackItem {
    track: Option<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct FeaturedPlaylistsResponse {
    playlists: Paging<Option<SimplifiedPlaylist>>,
}

#[derive(Debug, Deserialize)]
struct SimplifiedPlaylist {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    id: Option<String>,
    name: String,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
    album: SpotifyAlbum,
    preview_url: Option<String>,
    #[serde(default)]
    external_urls: ExternalUrls,
    #[serde(default)]
    duration_ms: u64,
    #[serde(default)]
    uri: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyAlbum {
    #[serde(default)]
    name: String,
    #[serde(default)]
    images: Vec<SpotifyImage>,
}

#[derive(Debug, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

impl SpotifyTrack {
    fn into_track(self) -> Option<Track> {
        let id = self.id?;
        let uri = if self.uri.is_empty() {
            format!("spotify:track:{}", id)
        } else {
            self.uri
        };

        Some(Track {
            id,
            name: self.name,
            artists: self.artists.into_iter().map(|a| a.name).collect(),
            album: self.album.name,
            image: self.album.images.into_iter().next().map(|i| i.url),
            preview_url: self.preview_url,
            external_url: self.external_urls.spotify,
            duration_ms: self.duration_ms,
            uri,
        })
    }
}

fn collect_tracks(tracks: impl IntoIterator<Item = SpotifyTrack>) -> Vec<Track> {
    tracks.into_iter().filter_map(SpotifyTrack::into_track).collect()
}

/// Listener profile (`GET /me`)
#[derive(Debug, Deserialize)]
pub struct SpotifyUser {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

/// Body of `POST /users/{id}/playlists`
#[derive(Debug, Serialize)]
pub struct NewPlaylist {
    pub name: String,
    pub description: String,
    pub public: bool,
}

/// Playlist as returned on creation
#[derive(Debug, Deserialize)]
pub struct SpotifyPlaylist {
    pub id: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Serialize)]
struct AddTracksRequest<'a> {
    uris: &'a [String],
}

#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    #[allow(dead_code)]
    snapshot_id: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// Spotify Web API client bound to a bearer token
pub struct SpotifyCatalog {
    http_client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl SpotifyCatalog {
    /// `http_client` should carry the per-request timeout; it is shared
    /// across listeners, the token is not.
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CatalogError> {
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(CatalogError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), error_text));
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, ?query, "Spotify GET");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await?;

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Spotify POST");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }

    async fn track_search<T: DeserializeOwned>(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<T>, CatalogError> {
        let limit = limit.to_string();
        let response: SearchResponse<T> = self
            .get_json(
                "/search",
                &[("q", query), ("type", "track"), ("limit", limit.as_str()), ("market", MARKET)],
            )
            .await?;

        Ok(response.tracks.items)
    }

    /// Track search normalised into [`Track`]s
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError> {
        let items: Vec<SpotifyTrack> = self.track_search(query, limit).await?;
        Ok(collect_tracks(items))
    }

    /// Track search returning Spotify's track objects untouched
    ///
    /// Backs the free-text `/search` route, whose browser client reads the
    /// full Spotify shape (`album.images`, `artists[].name`, `external_urls`).
    pub async fn search_raw(&self, query: &str, limit: u32) -> Result<Vec<Value>, CatalogError> {
        self.track_search(query, limit).await
    }

    pub async fn current_user(&self) -> Result<SpotifyUser, CatalogError> {
        self.get_json("/me", &[]).await
    }

    pub async fn create_playlist(
        &self,
        user_id: &str,
        playlist: &NewPlaylist,
    ) -> Result<SpotifyPlaylist, CatalogError> {
        self.post_json(&format!("/users/{}/playlists", user_id), playlist)
            .await
    }

    /// Append URIs to a playlist; callers keep each batch within the API limit
    pub async fn add_tracks_to_playlist(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError> {
        let _: SnapshotResponse = self
            .post_json(
                &format!("/playlists/{}/tracks", playlist_id),
                &AddTracksRequest { uris },
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogCapability for SpotifyCatalog {
    async fn search_tracks(&self, term: &str, limit: u32) -> Result<Vec<Track>, CatalogError> {
        self.search(&format!("genre:{}", term), limit).await
    }

    async fn saved_tracks(&self, limit: u32) -> Result<Vec<Track>, CatalogError> {
        let limit = limit.to_string();
        let response: Paging<TrackItem> = self.get_json("/me/tracks", &[("limit", limit.as_str())]).await?;

        Ok(collect_tracks(response.items.into_iter().filter_map(|i| i.track)))
    }

    async fn top_tracks(
        &self,
        limit: u32,
        time_range: TimeRange,
    ) -> Result<Vec<Track>, CatalogError> {
        let limit = limit.to_string();
        let response: Paging<SpotifyTrack> = self
            .get_json(
                "/me/top/tracks",
                &[("limit", limit.as_str()), ("time_range", time_range.as_str())],
            )
            .await?;

        Ok(collect_tracks(response.items))
    }

    async fn featured_playlists(&self, limit: u32) -> Result<Vec<CollectionRef>, CatalogError> {
        let limit = limit.to_string();
        let response: FeaturedPlaylistsResponse = self
            .get_json("/browse/featured-playlists", &[("limit", limit.as_str())])
            .await?;

        Ok(response
            .playlists
            .items
            .into_iter()
            .flatten()
            .map(|p| CollectionRef { id: p.id, name: p.name })
            .collect())
    }

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        limit: u32,
    ) -> Result<Vec<Track>, CatalogError> {
        let limit = limit.to_string();
        let response: Paging<TrackItem> = self
            .get_json(&format!("/playlists/{}/tracks", playlist_id), &[("limit", limit.as_str())])
            .await?;

        Ok(collect_tracks(response.items.into_iter().filter_map(|i| i.track)))
    }
}
