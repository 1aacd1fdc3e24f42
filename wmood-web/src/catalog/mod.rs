//! Music catalog capability
//!
//! The retriever never talks HTTP directly: it is handed a
//! [`CatalogCapability`] bound to a single listener's credential. Production
//! uses [`SpotifyCatalog`]; tests substitute an in-memory double.

pub mod spotify;

use async_trait::async_trait;
use thiserror::Error;
use wmood_common::{CollectionRef, TimeRange, Track};

pub use spotify::SpotifyCatalog;

/// Catalog call errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    /// Credential missing, expired or revoked (HTTP 401)
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CatalogError::Timeout
        } else if e.is_decode() {
            CatalogError::Parse(e.to_string())
        } else {
            CatalogError::Network(e.to_string())
        }
    }
}

/// Read-only catalog operations available to the track retriever
///
/// Every method is one authenticated call (or a short sequence of them)
/// against the external catalog. Implementations report faults as
/// [`CatalogError`]; deciding whether a fault matters is up to the caller.
#[async_trait]
pub trait CatalogCapability: Send + Sync {
    /// Keyword search over the catalog's tracks
    async fn search_tracks(&self, term: &str, limit: u32) -> Result<Vec<Track>, CatalogError>;

    /// Tracks saved to the listener's library
    async fn saved_tracks(&self, limit: u32) -> Result<Vec<Track>, CatalogError>;

    /// The listener's most played tracks over `time_range`
    async fn top_tracks(&self, limit: u32, time_range: TimeRange)
        -> Result<Vec<Track>, CatalogError>;

    /// Editorially featured collections
    async fn featured_playlists(&self, limit: u32) -> Result<Vec<CollectionRef>, CatalogError>;

    /// Tracks of one collection
    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        limit: u32,
    ) -> Result<Vec<Track>, CatalogError>;
}
