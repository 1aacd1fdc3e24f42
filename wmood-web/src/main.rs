//! wmood-web - WeatherMood HTTP service
//!
//! Serves the browser app, relays weather, manages Spotify sign-in and
//! builds weather-matched recommendations and playlists.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Mutex;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use wmood_common::config::{find_config_file, resolve_root_folder, RootFolder, TomlConfig};
use wmood_web::config::{CliArgs, ServiceConfig};
use wmood_web::db::{self, sessions};
use wmood_web::{build_router, AppState};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let config_path = find_config_file(args.config.as_deref());
    let (toml_config, config_error) = TomlConfig::load_or_default(config_path.as_deref());

    init_tracing(&toml_config)?;

    info!(
        "Starting WeatherMood (wmood-web) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match (&config_path, config_error) {
        (_, Some(e)) => warn!("{}; using default configuration", e),
        (Some(path), None) => info!("Loaded configuration from {}", path.display()),
        (None, None) => info!("No config file found, using defaults"),
    }

    let config = match ServiceConfig::resolve(&args, &toml_config) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    let root_folder = RootFolder::new(resolve_root_folder(
        args.root_folder.as_deref(),
        toml_config.root_folder.as_deref(),
    ));
    root_folder.ensure_directory_exists()?;

    let db_path = root_folder.database_path();
    info!("Database path: {}", db_path.display());

    let pool = db::init_database(&db_path)
        .await
        .context("Failed to open session database")?;

    match sessions::purge_expired(&pool).await {
        Ok(0) => {}
        Ok(n) => info!("Purged {} expired sessions", n),
        Err(e) => warn!("Session purge failed: {}", e),
    }
    spawn_session_purge(pool.clone());

    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    if let Some(dir) = &config.static_assets {
        info!("Serving static assets from {}", dir.display());
    }

    let bind_address = config.bind_address();
    let state = AppState::new(pool, http_client, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_address))?;
    info!("wmood-web listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins over the configured level; a configured log file replaces
/// stderr output.
fn init_tracing(config: &TomlConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match &config.logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.init(),
    }

    Ok(())
}

fn spawn_session_purge(pool: sqlx::SqlitePool) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        // First tick fires immediately; startup already purged
        interval.tick().await;

        loop {
            interval.tick().await;
            match sessions::purge_expired(&pool).await {
                Ok(0) => {}
                Ok(n) => info!("Purged {} expired sessions", n),
                Err(e) => warn!("Session purge failed: {}", e),
            }
        }
    });
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
