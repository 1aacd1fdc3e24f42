//! Spotify OAuth (authorization-code flow)
//!
//! Builds the authorize redirect, exchanges the callback code for tokens and
//! refreshes access tokens shortly before they expire.

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

pub const SPOTIFY_ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";

/// Permissions requested at login
pub const SCOPES: &[&str] = &[
    "user-read-private",
    "user-read-email",
    "user-top-read",
    "user-library-read",
    "user-read-playback-state",
    "streaming",
    "playlist-modify-public",
    "playlist-modify-private",
];

/// Refresh when the access token expires within this window
pub const REFRESH_MARGIN_MS: i64 = 5 * 60 * 1000;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Token endpoint error {0}: {1}")]
    Api(u16, String),

    #[error("No access token received from Spotify")]
    MissingAccessToken,

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AuthError::Timeout
        } else {
            AuthError::Network(e.to_string())
        }
    }
}

/// Application credentials registered with Spotify
#[derive(Debug, Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Tokens held for one listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Access token expiry, Unix epoch milliseconds
    pub expires_at_ms: i64,
}

impl TokenSet {
    /// True once `now_ms` is inside the refresh margin (or past expiry)
    pub fn needs_refresh(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms - REFRESH_MARGIN_MS
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: i64,
}

/// Client for Spotify's accounts service
pub struct SpotifyAuth {
    http_client: reqwest::Client,
    base_url: String,
    credentials: SpotifyCredentials,
}

impl SpotifyAuth {
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        credentials: SpotifyCredentials,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// URL the browser is redirected to for consent
    pub fn authorize_url(&self) -> Result<reqwest::Url, AuthError> {
        let scope = SCOPES.join(" ");
        reqwest::Url::parse_with_params(
            &format!("{}/authorize", self.base_url),
            &[
                ("response_type", "code"),
                ("client_id", self.credentials.client_id.as_str()),
                ("scope", scope.as_str()),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ],
        )
        .map_err(|e| AuthError::Parse(e.to_string()))
    }

    /// Exchange the authorization code from the callback
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, AuthError> {
        info!("Exchanging authorization code for access token");
        let response = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ])
            .await?;

        Self::into_token_set(response, None)
    }

    /// Obtain a fresh access token
    ///
    /// Spotify may omit a new refresh token, in which case the old one is kept.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, AuthError> {
        info!("Refreshing Spotify access token");
        let response = self
            .token_request(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .await?;

        Self::into_token_set(response, Some(refresh_token))
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let url = format!("{}/api/token", self.base_url);
        debug!(url = %url, "Spotify token request");

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::Parse(e.to_string()))
    }

    fn into_token_set(
        response: TokenResponse,
        previous_refresh_token: Option<&str>,
    ) -> Result<TokenSet, AuthError> {
        let access_token = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingAccessToken)?;

        Ok(TokenSet {
            access_token,
            refresh_token: response
                .refresh_token
                .or_else(|| previous_refresh_token.map(str::to_string)),
            expires_at_ms: Utc::now().timestamp_millis() + response.expires_in * 1000,
        })
    }
}
