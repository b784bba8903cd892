//! kotoba-ap specific configuration
//!
//! Resolved once at startup from command-line arguments, environment and
//! the TOML bootstrap file (see `kotoba_common::config`).

use crate::playback::PlaybackOptions;
use crate::{Error, Result};
use kotoba_common::config::{resolve_database_path, resolve_root_folder, TomlConfig, ROOT_FOLDER_ENV};
use std::path::{Path, PathBuf};

/// Resolved application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub root_folder: PathBuf,
    pub db_path: PathBuf,
    pub log_level: String,
    pub playback: PlaybackOptions,
}

impl Config {
    /// Resolve every setting: CLI, then environment, then TOML, then defaults
    pub fn resolve(cli_root: Option<&Path>, cli_database: Option<&Path>, toml: &TomlConfig) -> Result<Self> {
        let root_folder = resolve_root_folder(cli_root, ROOT_FOLDER_ENV, toml);
        let db_path = resolve_database_path(cli_database, &root_folder, toml);

        if db_path.is_dir() {
            return Err(Error::Config(format!(
                "Database path {} is a directory",
                db_path.display()
            )));
        }

        Ok(Self {
            root_folder,
            db_path,
            log_level: toml.logging.level.clone(),
            playback: PlaybackOptions::from(&toml.playback),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cli_paths_win() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = dir.path().join("custom.db");

        let config = Config::resolve(Some(dir.path()), Some(&db), &TomlConfig::default()).unwrap();
        assert_eq!(config.root_folder, dir.path());
        assert_eq!(config.db_path, db);
        assert_eq!(config.playback.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_directory_as_database_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = Config::resolve(Some(dir.path()), Some(dir.path()), &TomlConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
