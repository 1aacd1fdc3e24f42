//! In-process stand-in for Spotify and OpenWeatherMap
//!
//! One axum server answers for all three upstreams under distinct prefixes:
//! `/v1` (Web API), `/accounts` (OAuth) and `/data/2.5` (weather). Every
//! request is appended to a call log so tests can assert on call order.

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wmood_web::config::{Endpoints, ServiceConfig};
use wmood_web::services::SpotifyCredentials;

pub const GOOD_TOKEN: &str = "good-token";
pub const FRESH_TOKEN: &str = "fresh-token";

/// Behaviour knobs plus the call log
#[derive(Default)]
pub struct Upstream {
    /// Search term (without `genre:`) → number of tracks returned
    pub search_hits: HashMap<String, usize>,
    pub saved_tracks: usize,
    /// Featured playlist ids; `None` is sent as a `null` entry
    pub featured: Vec<Option<String>>,
    /// Tracks in every playlist (a `null` track is appended)
    pub playlist_tracks: usize,
    /// Token endpoint answers 400
    pub token_fails: bool,
    pub calls: Mutex<Vec<String>>,
}

impl Upstream {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

pub fn track_json(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Track {}", id),
        "artists": [{"name": "Artist"}],
        "album": {"name": "Album", "images": [{"url": format!("https://img/{}", id)}]},
        "preview_url": null,
        "external_urls": {"spotify": format!("https://open.spotify.com/track/{}", id)},
        "duration_ms": 180000,
        "uri": format!("spotify:track:{}", id)
    })
}

fn tracks(prefix: &str, count: usize) -> Vec<Value> {
    (0..count).map(|i| track_json(&format!("{}{}", prefix, i))).collect()
}

fn bearer(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string()
}

async fn search(
    State(up): State<Arc<Upstream>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let q = params.get("q").cloned().unwrap_or_default();
    up.record(format!("search:{}", q));

    let term = q.strip_prefix("genre:").unwrap_or(&q);
    let count = up.search_hits.get(term).copied().unwrap_or(0);
    Json(json!({"tracks": {"items": tracks(term, count)}}))
}

async fn saved(State(up): State<Arc<Upstream>>) -> Json<Value> {
    up.record("saved");
    let items: Vec<Value> = tracks("saved", up.saved_tracks)
        .into_iter()
        .map(|t| json!({"track": t}))
        .chain([json!({"track": null})])
        .collect();
    Json(json!({"items": items}))
}

async fn top(State(up): State<Arc<Upstream>>) -> Response {
    up.record("top");
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}

async fn featured(State(up): State<Arc<Upstream>>) -> Json<Value> {
    up.record("featured");
    let items: Vec<Value> = up
        .featured
        .iter()
        .map(|id| match id {
            Some(id) => json!({"id": id, "name": format!("Playlist {}", id)}),
            None => Value::Null,
        })
        .collect();
    Json(json!({"playlists": {"items": items}}))
}

async fn playlist_items(
    State(up): State<Arc<Upstream>>,
    Path(playlist_id): Path<String>,
) -> Json<Value> {
    up.record(format!("playlist:{}", playlist_id));
    let items: Vec<Value> = tracks(&playlist_id, up.playlist_tracks)
        .into_iter()
        .map(|t| json!({"track": t}))
        .chain([json!({"track": null})])
        .collect();
    Json(json!({"items": items}))
}

async fn me(State(up): State<Arc<Upstream>>, headers: HeaderMap) -> Response {
    let token = bearer(&headers);
    up.record(format!("me:{}", token));

    if token != GOOD_TOKEN && token != FRESH_TOKEN {
        return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
    }

    Json(json!({
        "id": "listener-1",
        "display_name": "Listener One",
        "email": "one@example.com",
        "images": [{"url": "https://img/avatar"}]
    }))
    .into_response()
}

async fn new_playlist(
    State(up): State<Arc<Upstream>>,
    Path(user_id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    up.record(format!(
        "create:{}:{}:{}:{}",
        user_id, body["name"], body["description"], body["public"]
    ));
    Json(json!({
        "id": "pl-1",
        "external_urls": {"spotify": "https://open.spotify.com/playlist/pl-1"}
    }))
}

async fn add_tracks(
    State(up): State<Arc<Upstream>>,
    Path(playlist_id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let count = body["uris"].as_array().map(|a| a.len()).unwrap_or(0);
    up.record(format!("add:{}:{}", playlist_id, count));
    Json(json!({"snapshot_id": "snap"}))
}

async fn token(
    State(up): State<Arc<Upstream>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let grant = form.get("grant_type").cloned().unwrap_or_default();
    let basic = headers.contains_key("authorization");
    up.record(format!("token:{}:{}", grant, basic));

    if up.token_fails {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid_grant"}))).into_response();
    }

    match grant.as_str() {
        "authorization_code" => Json(json!({
            "access_token": GOOD_TOKEN,
            "refresh_token": "refresh-1",
            "expires_in": 3600
        }))
        .into_response(),
        _ => Json(json!({"access_token": FRESH_TOKEN, "expires_in": 3600})).into_response(),
    }
}

async fn weather(
    State(up): State<Arc<Upstream>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let location = params
        .get("q")
        .cloned()
        .unwrap_or_else(|| format!("{},{}", params["lat"], params["lon"]));
    up.record(format!("weather:{}:{}", location, params["units"]));

    if location == "Atlantis" {
        return (StatusCode::NOT_FOUND, Json(json!({"cod": "404"}))).into_response();
    }

    Json(json!({
        "name": "London",
        "main": {"temp": 14.4, "humidity": 72},
        "weather": [{"main": "Drizzle", "description": "light drizzle"}]
    }))
    .into_response()
}

/// Start the mock upstream, returning its base URL
pub async fn spawn_upstream(upstream: Arc<Upstream>) -> String {
    let app = Router::new()
        .route("/v1/search", get(search))
        .route("/v1/me", get(me))
        .route("/v1/me/tracks", get(saved))
        .route("/v1/me/top/tracks", get(top))
        .route("/v1/browse/featured-playlists", get(featured))
        .route("/v1/users/:user_id/playlists", post(new_playlist))
        .route(
            "/v1/playlists/:playlist_id/tracks",
            get(playlist_items).post(add_tracks),
        )
        .route("/accounts/api/token", post(token))
        .route("/data/2.5/weather", get(weather))
        .with_state(upstream);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

pub fn endpoints(base_url: &str) -> Endpoints {
    Endpoints {
        spotify_api: format!("{}/v1", base_url),
        spotify_accounts: format!("{}/accounts", base_url),
        weather_api: format!("{}/data/2.5", base_url),
    }
}

pub fn credentials() -> SpotifyCredentials {
    SpotifyCredentials {
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
        redirect_uri: "http://127.0.0.1:5000/callback".to_string(),
    }
}

pub fn test_config(base_url: &str) -> ServiceConfig {
    ServiceConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        static_assets: None,
        http_timeout: Duration::from_secs(5),
        cors_origins: vec!["http://127.0.0.1:5000".to_string()],
        spotify: credentials(),
        weather_api_key: "weather-key".to_string(),
        endpoints: endpoints(base_url),
    }
}

/// Single-connection in-memory database with the session schema
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    wmood_web::db::create_schema(&pool).await.unwrap();
    pool
}
