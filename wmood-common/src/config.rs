//! Bootstrap configuration and root folder resolution
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable TOML file is never fatal: a warning is logged and
//! the compiled defaults apply.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming an explicit config file
pub const ENV_CONFIG_FILE: &str = "WMOOD_CONFIG";
/// Environment variable naming the root folder
pub const ENV_ROOT_FOLDER: &str = "WMOOD_ROOT_FOLDER";

const APP_DIR_NAME: &str = "weathermood";
const DATABASE_FILE_NAME: &str = "weathermood.db";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; absent fields fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Bind address for the HTTP server
    #[serde(default)]
    pub host: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Folder holding the session database
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Folder of browser assets served at `/`
    #[serde(default)]
    pub static_assets: Option<PathBuf>,

    /// Per-request timeout for outbound HTTP calls, in seconds
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,

    /// Origins allowed to make credentialed cross-origin requests
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub spotify: SpotifyConfig,

    #[serde(default)]
    pub weather: WeatherConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Spotify application credentials
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
}

/// OpenWeatherMap credentials
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
}

impl TomlConfig {
    /// Read and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the config file if one is available, otherwise defaults
    ///
    /// Returns the load failure alongside the defaults so callers can report
    /// it once logging is initialised.
    pub fn load_or_default(path: Option<&Path>) -> (Self, Option<Error>) {
        match path {
            Some(path) => match Self::load(path) {
                Ok(config) => (config, None),
                Err(e) => (Self::default(), Some(e)),
            },
            None => (Self::default(), None),
        }
    }
}

/// Locate the TOML config file
///
/// Priority: CLI path → `WMOOD_CONFIG` → `~/.config/weathermood/config.toml`
/// → `/etc/weathermood/config.toml` (Linux only). Implicit locations are only
/// returned if the file exists; explicit ones are returned as given.
pub fn find_config_file(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Some(path) = non_blank_env(ENV_CONFIG_FILE) {
        return Some(PathBuf::from(path));
    }

    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc").join(APP_DIR_NAME).join("config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Where a resolved setting came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine,
    Environment,
    Toml,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::CommandLine => write!(f, "command line"),
            ConfigSource::Environment => write!(f, "environment"),
            ConfigSource::Toml => write!(f, "TOML config"),
        }
    }
}

/// Resolve a string setting: CLI → ENV → TOML
///
/// Blank values are skipped at every tier.
pub fn resolve_string(
    cli_arg: Option<&str>,
    env_var_name: &str,
    toml_value: Option<&str>,
) -> Option<(String, ConfigSource)> {
    if let Some(value) = cli_arg.filter(|v| is_valid_key(v)) {
        return Some((value.to_string(), ConfigSource::CommandLine));
    }

    if let Some(value) = non_blank_env(env_var_name) {
        return Some((value, ConfigSource::Environment));
    }

    toml_value
        .filter(|v| is_valid_key(v))
        .map(|v| (v.to_string(), ConfigSource::Toml))
}

/// Resolve a required secret or fail with a message naming every source
pub fn require_string(
    setting: &str,
    cli_flag: &str,
    env_var_name: &str,
    toml_key: &str,
    cli_arg: Option<&str>,
    toml_value: Option<&str>,
) -> Result<String> {
    match resolve_string(cli_arg, env_var_name, toml_value) {
        Some((value, source)) => {
            info!("{} loaded from {}", setting, source);
            Ok(value)
        }
        None => Err(Error::Config(format!(
            "{} not configured. Please configure using one of:\n\
             1. Command line: {}\n\
             2. Environment: {}=...\n\
             3. TOML config: {}",
            setting, cli_flag, env_var_name, toml_key
        ))),
    }
}

/// Validate a credential value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

fn non_blank_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| is_valid_key(v))
}

/// Root folder resolution: CLI → `WMOOD_ROOT_FOLDER` → TOML → OS default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_value: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Some(path) = non_blank_env(ENV_ROOT_FOLDER) {
        return PathBuf::from(path);
    }

    if let Some(path) = toml_value {
        return path.to_path_buf();
    }

    default_root_folder()
}

/// OS-dependent default root folder
///
/// `~/.local/share/weathermood` on Linux, `%LOCALAPPDATA%\weathermood` on
/// Windows, `~/Library/Application Support/weathermood` on macOS.
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./weathermood_data"))
}

/// Resolved root folder, responsible for its own creation
#[derive(Debug, Clone)]
pub struct RootFolder {
    path: PathBuf,
}

impl RootFolder {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the folder (and parents) if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.path.exists() {
            std::fs::create_dir_all(&self.path)?;
            info!("Created root folder: {}", self.path.display());
        }
        Ok(())
    }

    /// Session database inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.path.join(DATABASE_FILE_NAME)
    }
}
