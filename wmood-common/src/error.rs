//! Errors shared by the WeatherMood crates

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures outside any single upstream client: startup configuration,
/// filesystem access and the session store.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or unparseable setting; the message names where to set it
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "sqlx")]
    #[error("Session store error: {0}")]
    Database(#[from] sqlx::Error),
}
