//! Fallback track retriever
//!
//! Turns a weather condition into a list of tracks by trying an ordered chain
//! of catalog strategies until one yields something:
//!
//! 1. Keyword search for each of the mood's search terms, in priority order
//! 2. The listener's saved tracks
//! 3. The listener's short-term top tracks
//! 4. Tracks of the first featured playlist
//! 5. One last keyword search for [`FALLBACK_TERM`]
//!
//! Strategies run strictly one after another and the first non-empty result
//! wins. A failing strategy (network error, timeout, non-2xx, bad payload,
//! expired token) counts as empty and the chain moves on. Only exhausting the
//! whole chain is an error.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use wmood_common::{Mood, MoodQuery, TimeRange, Track};

use crate::catalog::{CatalogCapability, CatalogError};

/// Upper bound on tracks returned, and the page size asked of each strategy
pub const MAX_TRACKS: usize = 26;

/// Term used by the last-resort keyword search
pub const FALLBACK_TERM: &str = "popular";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetrievalError {
    /// Every strategy came back empty or failed
    #[error("Could not find any music tracks")]
    NoResultsFound,
}

/// Which strategy produced the returned tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyUsed {
    Search,
    SavedTracks,
    TopTracks,
    FeaturedPlaylists,
    FallbackSearch,
}

impl StrategyUsed {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyUsed::Search => "search",
            StrategyUsed::SavedTracks => "saved_tracks",
            StrategyUsed::TopTracks => "top_tracks",
            StrategyUsed::FeaturedPlaylists => "featured_playlists",
            StrategyUsed::FallbackSearch => "fallback_search",
        }
    }
}

/// Successful retrieval with provenance
///
/// `tracks` is never empty and holds at most [`MAX_TRACKS`] entries.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalOutcome {
    tracks: Vec<Track>,
    strategy_used: StrategyUsed,
    term_used: Option<String>,
    mood: Mood,
}

impl RetrievalOutcome {
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }

    pub fn strategy_used(&self) -> StrategyUsed {
        self.strategy_used
    }

    /// Search term that matched; `None` for library/featured strategies
    pub fn term_used(&self) -> Option<&str> {
        self.term_used.as_deref()
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }
}

/// One step of the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy<'a> {
    Search(&'a str),
    SavedTracks,
    TopTracks,
    FeaturedPlaylists,
    FallbackSearch,
}

impl<'a> Strategy<'a> {
    fn used(&self) -> StrategyUsed {
        match self {
            Strategy::Search(_) => StrategyUsed::Search,
            Strategy::SavedTracks => StrategyUsed::SavedTracks,
            Strategy::TopTracks => StrategyUsed::TopTracks,
            Strategy::FeaturedPlaylists => StrategyUsed::FeaturedPlaylists,
            Strategy::FallbackSearch => StrategyUsed::FallbackSearch,
        }
    }

    fn term(&self) -> Option<&'a str> {
        match self {
            Strategy::Search(term) => Some(*term),
            Strategy::FallbackSearch => Some(FALLBACK_TERM),
            _ => None,
        }
    }

    async fn attempt(&self, catalog: &dyn CatalogCapability) -> Result<Vec<Track>, CatalogError> {
        let limit = MAX_TRACKS as u32;

        match self {
            Strategy::Search(term) => catalog.search_tracks(term, limit).await,
            Strategy::SavedTracks => catalog.saved_tracks(limit).await,
            Strategy::TopTracks => catalog.top_tracks(limit, TimeRange::ShortTerm).await,
            Strategy::FeaturedPlaylists => {
                let playlists = catalog.featured_playlists(limit).await?;
                match playlists.first() {
                    Some(playlist) => catalog.playlist_tracks(&playlist.id, limit).await,
                    None => Ok(Vec::new()),
                }
            }
            Strategy::FallbackSearch => catalog.search_tracks(FALLBACK_TERM, limit).await,
        }
    }
}

fn strategy_chain(query: &MoodQuery) -> Vec<Strategy<'static>> {
    query
        .search_terms()
        .iter()
        .copied()
        .map(Strategy::Search)
        .chain([
            Strategy::SavedTracks,
            Strategy::TopTracks,
            Strategy::FeaturedPlaylists,
            Strategy::FallbackSearch,
        ])
        .collect()
}

/// Retrieve tracks for a weather condition string
pub async fn retrieve(
    condition: &str,
    catalog: &dyn CatalogCapability,
) -> Result<RetrievalOutcome, RetrievalError> {
    let query = MoodQuery::classify(condition);
    retrieve_for_mood(&query, catalog).await
}

/// Retrieve tracks for an already classified mood
pub async fn retrieve_for_mood(
    query: &MoodQuery,
    catalog: &dyn CatalogCapability,
) -> Result<RetrievalOutcome, RetrievalError> {
    debug!(
        condition = %query.condition(),
        mood = ?query.mood(),
        terms = ?query.search_terms(),
        "Retrieving tracks"
    );

    for strategy in strategy_chain(query) {
        let used = strategy.used().as_str();
        let term = strategy.term().unwrap_or("-");
        debug!(strategy = used, term, "Trying strategy");

        match strategy.attempt(catalog).await {
            Ok(mut tracks) if !tracks.is_empty() => {
                tracks.truncate(MAX_TRACKS);
                info!(
                    strategy = used,
                    term,
                    count = tracks.len(),
                    "Found tracks"
                );

                return Ok(RetrievalOutcome {
                    tracks,
                    strategy_used: strategy.used(),
                    term_used: strategy.term().map(str::to_string),
                    mood: query.mood(),
                });
            }
            Ok(_) => debug!(strategy = used, term, "Strategy returned no tracks"),
            Err(e) => warn!(strategy = used, term, error = %e, "Strategy failed, continuing"),
        }
    }

    warn!(condition = %query.condition(), "All strategies exhausted");
    Err(RetrievalError::NoResultsFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use wmood_common::CollectionRef;

    /// What a mocked call should produce
    #[derive(Clone)]
    enum Reply {
        Tracks(usize),
        Fail,
    }

    fn tracks(prefix: &str, count: usize) -> Vec<Track> {
        (0..count)
            .map(|i| Track {
                id: format!("{}-{}", prefix, i),
                name: format!("{} track {}", prefix, i),
                artists: vec!["Artist".to_string()],
                album: "Album".to_string(),
                image: None,
                preview_url: None,
                external_url: None,
                duration_ms: 180_000,
                uri: format!("spotify:track:{}-{}", prefix, i),
            })
            .collect()
    }

    /// Catalog double: configured replies per call, records every call
    #[derive(Default)]
    struct MockCatalog {
        search: HashMap<String, Reply>,
        saved: Option<Reply>,
        top: Option<Reply>,
        featured: Vec<CollectionRef>,
        featured_fails: bool,
        playlist: Option<Reply>,
        calls: Mutex<Vec<String>>,
    }

    impl MockCatalog {
        fn with_search(mut self, term: &str, reply: Reply) -> Self {
            self.search.insert(term.to_string(), reply);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn reply(prefix: &str, reply: Option<&Reply>) -> Result<Vec<Track>, CatalogError> {
            match reply {
                Some(Reply::Tracks(n)) => Ok(tracks(prefix, *n)),
                Some(Reply::Fail) => Err(CatalogError::Api(500, "boom".to_string())),
                None => Ok(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CatalogCapability for MockCatalog {
        async fn search_tracks(&self, term: &str, limit: u32) -> Result<Vec<Track>, CatalogError> {
            assert_eq!(limit, 26);
            self.record(format!("search:{}", term));
            Self::reply(term, self.search.get(term))
        }

        async fn saved_tracks(&self, _limit: u32) -> Result<Vec<Track>, CatalogError> {
            self.record("saved".to_string());
            Self::reply("saved", self.saved.as_ref())
        }

        async fn top_tracks(
            &self,
            _limit: u32,
            time_range: TimeRange,
        ) -> Result<Vec<Track>, CatalogError> {
            assert_eq!(time_range, TimeRange::ShortTerm);
            self.record("top".to_string());
            Self::reply("top", self.top.as_ref())
        }

        async fn featured_playlists(&self, _limit: u32) -> Result<Vec<CollectionRef>, CatalogError> {
            self.record("featured".to_string());
            if self.featured_fails {
                return Err(CatalogError::Timeout);
            }
            Ok(self.featured.clone())
        }

        async fn playlist_tracks(
            &self,
            playlist_id: &str,
            _limit: u32,
        ) -> Result<Vec<Track>, CatalogError> {
            self.record(format!("playlist:{}", playlist_id));
            Self::reply("playlist", self.playlist.as_ref())
        }
    }

    #[tokio::test]
    async fn test_first_term_short_circuits() {
        let catalog = MockCatalog::default().with_search("sunny", Reply::Tracks(5));

        let outcome = retrieve("Clear", &catalog).await.unwrap();

        assert_eq!(outcome.strategy_used(), StrategyUsed::Search);
        assert_eq!(outcome.term_used(), Some("sunny"));
        assert_eq!(outcome.tracks().len(), 5);
        assert_eq!(outcome.mood(), Mood::Sunny);
        assert_eq!(catalog.calls(), vec!["search:sunny"]);
    }

    #[tokio::test]
    async fn test_light_rain_showers_scenario() {
        let catalog = MockCatalog::default()
            .with_search("rainy", Reply::Tracks(0))
            .with_search("chill", Reply::Tracks(0))
            .with_search("acoustic", Reply::Tracks(3))
            .with_search("calm", Reply::Tracks(10));

        let outcome = retrieve("light rain showers", &catalog).await.unwrap();

        assert_eq!(outcome.strategy_used(), StrategyUsed::Search);
        assert_eq!(outcome.term_used(), Some("acoustic"));
        assert_eq!(outcome.tracks().len(), 3);
        assert_eq!(
            catalog.calls(),
            vec!["search:rainy", "search:chill", "search:acoustic"]
        );
    }

    #[tokio::test]
    async fn test_saved_tracks_after_all_terms_empty() {
        let catalog = MockCatalog {
            saved: Some(Reply::Tracks(4)),
            top: Some(Reply::Tracks(4)),
            ..Default::default()
        };

        let outcome = retrieve("Tornado", &catalog).await.unwrap();

        assert_eq!(outcome.strategy_used(), StrategyUsed::SavedTracks);
        assert_eq!(outcome.term_used(), None);
        assert_eq!(outcome.tracks()[0].id, "saved-0");

        let calls = catalog.calls();
        assert_eq!(
            calls,
            vec!["search:popular", "search:hits", "search:trending", "search:viral", "saved"]
        );
        assert!(!calls.iter().any(|c| c == "top" || c == "featured"));
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let catalog = MockCatalog {
            saved: Some(Reply::Fail),
            top: Some(Reply::Tracks(2)),
            ..Default::default()
        }
        .with_search("epic", Reply::Fail)
        .with_search("rock", Reply::Fail);

        let outcome = retrieve("Thunderstorm", &catalog).await.unwrap();

        assert_eq!(outcome.strategy_used(), StrategyUsed::TopTracks);
        assert_eq!(outcome.tracks().len(), 2);
        assert_eq!(catalog.calls().last().map(String::as_str), Some("top"));
    }

    #[tokio::test]
    async fn test_featured_uses_first_playlist() {
        let catalog = MockCatalog {
            featured: vec![
                CollectionRef { id: "first".to_string(), name: "Today's Top Hits".to_string() },
                CollectionRef { id: "second".to_string(), name: "RapCaviar".to_string() },
            ],
            playlist: Some(Reply::Tracks(7)),
            ..Default::default()
        };

        let outcome = retrieve("Snow", &catalog).await.unwrap();

        assert_eq!(outcome.strategy_used(), StrategyUsed::FeaturedPlaylists);
        assert_eq!(outcome.term_used(), None);
        assert_eq!(outcome.tracks().len(), 7);

        let calls = catalog.calls();
        assert!(calls.contains(&"playlist:first".to_string()));
        assert!(!calls.contains(&"playlist:second".to_string()));
    }

    #[tokio::test]
    async fn test_final_fallback_search() {
        // "popular" is not among the foggy terms, so only the final step matches
        let catalog = MockCatalog {
            featured_fails: true,
            ..Default::default()
        }
        .with_search("popular", Reply::Tracks(1));

        let outcome = retrieve("Mist", &catalog).await.unwrap();

        assert_eq!(outcome.strategy_used(), StrategyUsed::FallbackSearch);
        assert_eq!(outcome.term_used(), Some("popular"));
        assert_eq!(
            catalog.calls(),
            vec![
                "search:mysterious",
                "search:ambient",
                "search:atmospheric",
                "search:ethereal",
                "search:dreamy",
                "saved",
                "top",
                "featured",
                "search:popular",
            ]
        );
    }

    #[tokio::test]
    async fn test_exhaustion_is_no_results_found() {
        let catalog = MockCatalog {
            saved: Some(Reply::Fail),
            featured: vec![CollectionRef { id: "p".to_string(), name: "p".to_string() }],
            playlist: Some(Reply::Tracks(0)),
            ..Default::default()
        };

        let err = retrieve("Haze", &catalog).await.unwrap_err();

        assert_eq!(err, RetrievalError::NoResultsFound);
        assert_eq!(catalog.calls().last().map(String::as_str), Some("search:popular"));
    }

    #[tokio::test]
    async fn test_truncates_to_prefix() {
        let catalog = MockCatalog::default().with_search("indie", Reply::Tracks(40));

        let outcome = retrieve("Clouds", &catalog).await.unwrap();

        assert_eq!(outcome.tracks().len(), MAX_TRACKS);
        let ids: Vec<_> = outcome.tracks().iter().map(|t| t.id.clone()).collect();
        let expected: Vec<_> = (0..26).map(|i| format!("indie-{}", i)).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_repeated_calls_are_identical() {
        let catalog = MockCatalog {
            top: Some(Reply::Tracks(3)),
            ..Default::default()
        };

        let first = retrieve("breeze", &catalog).await.unwrap();
        let second = retrieve("breeze", &catalog).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.strategy_used(), StrategyUsed::TopTracks);
    }

    #[test]
    fn test_chain_order() {
        let chain = strategy_chain(&MoodQuery::classify("Rain"));
        assert_eq!(
            chain,
            vec![
                Strategy::Search("rainy"),
                Strategy::Search("chill"),
                Strategy::Search("acoustic"),
                Strategy::Search("calm"),
                Strategy::Search("lo-fi"),
                Strategy::SavedTracks,
                Strategy::TopTracks,
                Strategy::FeaturedPlaylists,
                Strategy::FallbackSearch,
            ]
        );
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(StrategyUsed::SavedTracks.as_str(), "saved_tracks");
        assert_eq!(
            serde_json::to_string(&StrategyUsed::FeaturedPlaylists).unwrap(),
            "\"featured_playlists\""
        );
    }
}
