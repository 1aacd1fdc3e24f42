//! Catalog track model
//!
//! Provider-neutral shape of a track as relayed to the browser. Catalog
//! adapters normalise their wire formats into these types.

use serde::{Deserialize, Serialize};

/// Track returned by a music catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Catalog identifier
    pub id: String,
    /// Track title
    pub name: String,
    /// Artist display names, in credit order
    pub artists: Vec<String>,
    /// Album (collection) name
    pub album: String,
    /// Album artwork URL (largest available)
    pub image: Option<String>,
    /// 30-second preview stream, when the catalog licenses one
    pub preview_url: Option<String>,
    /// Link to the track on the catalog's own site
    pub external_url: Option<String>,
    pub duration_ms: u64,
    /// Catalog URI used when adding the track to a playlist
    pub uri: String,
}

/// Reference to a featured collection (playlist) in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRef {
    pub id: String,
    pub name: String,
}

/// Time window for a listener's top items
///
/// Recommendations only look at recent listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    /// Roughly the last four weeks
    #[default]
    ShortTerm,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
        }
    }
}
