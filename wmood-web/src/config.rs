//! Service configuration
//!
//! Command-line flags are parsed with clap; every setting then resolves
//! CLI → ENV → TOML → compiled default via `wmood_common::config`.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use wmood_common::config::{require_string, resolve_string, TomlConfig};
use wmood_common::Result;

use crate::catalog::spotify::SPOTIFY_API_BASE_URL;
use crate::services::spotify_auth::SPOTIFY_ACCOUNTS_BASE_URL;
use crate::services::weather_client::OPENWEATHER_BASE_URL;
use crate::services::SpotifyCredentials;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CORS_ORIGIN: &str = "http://127.0.0.1:5000";

pub const ENV_SPOTIFY_CLIENT_ID: &str = "SPOTIFY_CLIENT_ID";
pub const ENV_SPOTIFY_CLIENT_SECRET: &str = "SPOTIFY_CLIENT_SECRET";
pub const ENV_SPOTIFY_REDIRECT_URI: &str = "SPOTIFY_REDIRECT_URI";
pub const ENV_WEATHER_API_KEY: &str = "WEATHER_API_KEY";

#[derive(Parser, Debug, Default)]
#[command(name = "wmood-web")]
#[command(about = "Weather-driven music recommendations backed by Spotify")]
#[command(version)]
pub struct CliArgs {
    /// Path to TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Folder holding the session database
    #[arg(short, long)]
    pub root_folder: Option<PathBuf>,

    /// Bind address
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Folder of browser assets to serve
    #[arg(long)]
    pub static_assets: Option<PathBuf>,

    #[arg(long)]
    pub spotify_client_id: Option<String>,

    #[arg(long)]
    pub spotify_client_secret: Option<String>,

    #[arg(long)]
    pub spotify_redirect_uri: Option<String>,

    #[arg(long)]
    pub weather_api_key: Option<String>,
}

/// Base URLs of the external services
///
/// Overridden in tests to point at local mock servers.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub spotify_api: String,
    pub spotify_accounts: String,
    pub weather_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            spotify_api: SPOTIFY_API_BASE_URL.to_string(),
            spotify_accounts: SPOTIFY_ACCOUNTS_BASE_URL.to_string(),
            weather_api: OPENWEATHER_BASE_URL.to_string(),
        }
    }
}

/// Fully resolved runtime configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub static_assets: Option<PathBuf>,
    pub http_timeout: Duration,
    pub cors_origins: Vec<String>,
    pub spotify: SpotifyCredentials,
    pub weather_api_key: String,
    pub endpoints: Endpoints,
}

impl ServiceConfig {
    /// Merge CLI flags, environment and TOML into a runtime config
    ///
    /// Fails only when a credential is missing from all three sources.
    pub fn resolve(args: &CliArgs, toml: &TomlConfig) -> Result<Self> {
        let spotify = SpotifyCredentials {
            client_id: require_string(
                "Spotify client id",
                "--spotify-client-id",
                ENV_SPOTIFY_CLIENT_ID,
                "spotify.client_id",
                args.spotify_client_id.as_deref(),
                toml.spotify.client_id.as_deref(),
            )?,
            client_secret: require_string(
                "Spotify client secret",
                "--spotify-client-secret",
                ENV_SPOTIFY_CLIENT_SECRET,
                "spotify.client_secret",
                args.spotify_client_secret.as_deref(),
                toml.spotify.client_secret.as_deref(),
            )?,
            redirect_uri: require_string(
                "Spotify redirect URI",
                "--spotify-redirect-uri",
                ENV_SPOTIFY_REDIRECT_URI,
                "spotify.redirect_uri",
                args.spotify_redirect_uri.as_deref(),
                toml.spotify.redirect_uri.as_deref(),
            )?,
        };

        let weather_api_key = require_string(
            "OpenWeatherMap API key",
            "--weather-api-key",
            ENV_WEATHER_API_KEY,
            "weather.api_key",
            args.weather_api_key.as_deref(),
            toml.weather.api_key.as_deref(),
        )?;

        // PORT is read by clap alongside --port
        let port = args.port.or(toml.port).unwrap_or(DEFAULT_PORT);

        let host = resolve_string(args.host.as_deref(), "WMOOD_HOST", toml.host.as_deref())
            .map(|(host, _)| host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let static_assets = args
            .static_assets
            .clone()
            .or_else(|| toml.static_assets.clone());

        let cors_origins = if toml.cors_origins.is_empty() {
            vec![DEFAULT_CORS_ORIGIN.to_string()]
        } else {
            toml.cors_origins.clone()
        };

        let http_timeout =
            Duration::from_secs(toml.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS));

        info!(
            host = %host,
            port,
            timeout_secs = http_timeout.as_secs(),
            "Service configuration resolved"
        );

        Ok(Self {
            host,
            port,
            static_assets,
            http_timeout,
            cors_origins,
            spotify,
            weather_api_key,
            endpoints: Endpoints::default(),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
