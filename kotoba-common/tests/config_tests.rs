//! Configuration tests
//!
//! Tests that manipulate KOTOBA_ROOT_FOLDER or KOTOBA_DATABASE are marked
//! with #[serial] so they never run in parallel.

use kotoba_common::config::{
    get_default_root_folder, resolve_database_path, resolve_root_folder, TomlConfig,
    DATABASE_ENV, DATABASE_FILE_NAME, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

#[test]
fn test_default_config_values() {
    let config = TomlConfig::default();
    assert!(config.root_folder.is_none());
    assert!(config.database_path.is_none());
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.playback.poll_interval_ms(), 100);
}

#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
root_folder = "/srv/kotoba"

[logging]
level = "debug"

[playback]
position_poll_interval_ms = 250
"#
    )
    .unwrap();

    let config = TomlConfig::from_file(file.path()).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/kotoba")));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.playback.poll_interval_ms(), 250);
}

#[test]
fn test_poll_interval_clamped() {
    let mut config = TomlConfig::default();
    config.playback.position_poll_interval_ms = 1;
    assert_eq!(config.playback.poll_interval_ms(), 20);
    config.playback.position_poll_interval_ms = 60_000;
    assert_eq!(config.playback.poll_interval_ms(), 1000);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "root_folder = [not toml").unwrap();

    let result = TomlConfig::from_file(file.path());
    assert!(matches!(result, Err(kotoba_common::Error::Config(_))));
}

#[test]
fn test_missing_config_file_is_io_error() {
    let result = TomlConfig::from_file(Path::new("/nonexistent/kotoba/config.toml"));
    assert!(matches!(result, Err(kotoba_common::Error::Io(_))));
}

#[test]
#[serial]
fn test_root_folder_cli_beats_env_and_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    let resolved = resolve_root_folder(Some(Path::new("/from/cli")), ROOT_FOLDER_ENV, &config);
    assert_eq!(resolved, PathBuf::from("/from/cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_root_folder_env_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    assert_eq!(resolve_root_folder(None, ROOT_FOLDER_ENV, &config), PathBuf::from("/from/env"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_root_folder_falls_back_to_toml_then_default() {
    env::remove_var(ROOT_FOLDER_ENV);
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };
    assert_eq!(resolve_root_folder(None, ROOT_FOLDER_ENV, &config), PathBuf::from("/from/toml"));

    let resolved = resolve_root_folder(None, ROOT_FOLDER_ENV, &TomlConfig::default());
    assert_eq!(resolved, get_default_root_folder());
}

#[test]
#[serial]
fn test_database_path_defaults_into_root_folder() {
    env::remove_var(DATABASE_ENV);
    let root = Path::new("/data/kotoba");

    let resolved = resolve_database_path(None, root, &TomlConfig::default());
    assert_eq!(resolved, root.join(DATABASE_FILE_NAME));

    env::set_var(DATABASE_ENV, "/tmp/other.db");
    let resolved = resolve_database_path(None, root, &TomlConfig::default());
    assert_eq!(resolved, PathBuf::from("/tmp/other.db"));
    env::remove_var(DATABASE_ENV);
}
