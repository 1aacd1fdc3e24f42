//! wmood-web library - WeatherMood HTTP service
//!
//! Relays current weather, signs listeners in with Spotify and turns the
//! weather condition into track recommendations via the fallback retriever.

use axum::{middleware, Router};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod retrieval;
pub mod services;

use catalog::SpotifyCatalog;
use config::ServiceConfig;
use services::{SpotifyAuth, WeatherClient};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Session database
    pub db: SqlitePool,
    /// Outbound HTTP client, carries the request timeout
    pub http_client: reqwest::Client,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(db: SqlitePool, http_client: reqwest::Client, config: ServiceConfig) -> Self {
        Self {
            db,
            http_client,
            config: Arc::new(config),
        }
    }

    /// Catalog client acting for one listener
    pub fn catalog(&self, access_token: &str) -> SpotifyCatalog {
        SpotifyCatalog::new(
            self.http_client.clone(),
            &self.config.endpoints.spotify_api,
            access_token,
        )
    }

    pub fn auth(&self) -> SpotifyAuth {
        SpotifyAuth::new(
            self.http_client.clone(),
            &self.config.endpoints.spotify_accounts,
            self.config.spotify.clone(),
        )
    }

    pub fn weather(&self) -> WeatherClient {
        WeatherClient::new(
            self.http_client.clone(),
            &self.config.endpoints.weather_api,
            &self.config.weather_api_key,
        )
    }
}

/// Build application router
///
/// Routes that act on the listener's Spotify account run behind the token
/// refresh middleware; weather, login and health do not.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let spotify = Router::new()
        .route("/me", get(api::current_user))
        .route("/recommendations", get(api::recommendations))
        .route("/test-music", get(api::test_music))
        .route("/search", get(api::search))
        .route("/create-playlist", post(api::create_playlist))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::refresh_token_middleware,
        ));

    let public = Router::new()
        .route("/weather", get(api::weather_by_coordinates))
        .route("/weather/city", get(api::weather_by_city))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/logout", post(api::logout))
        .merge(api::health_routes());

    let mut router = Router::new().merge(spotify).merge(public);

    if let Some(dir) = &state.config.static_assets {
        router = router.fallback_service(api::static_files(dir));
    }

    router
        .layer(cors_layer(&state.config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
