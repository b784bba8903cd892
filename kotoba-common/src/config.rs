//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration is deliberately small: where the data lives, how
//! loud the logs are, and how often the player samples its position.
//! Everything else is content in the database.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the data root folder
pub const ROOT_FOLDER_ENV: &str = "KOTOBA_ROOT_FOLDER";

/// Environment variable overriding the database file path
pub const DATABASE_ENV: &str = "KOTOBA_DATABASE";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "kotoba.db";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Data root folder (optional, resolved further by [`resolve_root_folder`])
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Explicit database path (optional, defaults to `<root>/kotoba.db`)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Playback configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackConfig {
    /// Position sampling period while playing, clamped to 20-1000ms
    #[serde(default = "default_poll_interval_ms")]
    pub position_poll_interval_ms: u64,
}

impl PlaybackConfig {
    pub fn poll_interval_ms(&self) -> u64 {
        self.position_poll_interval_ms.clamp(20, 1000)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            position_poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval_ms() -> u64 {
    100
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid TOML in {}: {}", path.display(), e)))
    }

    /// Load the platform config file, falling back to defaults when absent
    ///
    /// A missing or unreadable config file is never fatal.
    pub fn load_or_default() -> Self {
        match config_file_path() {
            Ok(path) => match Self::from_file(&path) {
                Ok(config) => {
                    debug!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring config file: {}", e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config: &TomlConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(root_folder) = &config.root_folder {
        return root_folder.clone();
    }

    get_default_root_folder()
}

/// Database path resolution, same priority order as the root folder
///
/// Without an explicit database path the database lives in the root folder.
pub fn resolve_database_path(
    cli_arg: Option<&Path>,
    root_folder: &Path,
    config: &TomlConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATABASE_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.database_path {
        return path.clone();
    }

    root_folder.join(DATABASE_FILE_NAME)
}

/// Get configuration file path for the platform
pub fn config_file_path() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("kotoba").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/kotoba/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// Get OS-dependent default root folder path
pub fn get_default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/kotoba
        dirs::data_local_dir()
            .map(|d| d.join("kotoba"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/kotoba"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/kotoba
        dirs::data_dir()
            .map(|d| d.join("kotoba"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/kotoba"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\kotoba
        dirs::data_local_dir()
            .map(|d| d.join("kotoba"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\kotoba"))
    } else {
        PathBuf::from("./kotoba_data")
    }
}
