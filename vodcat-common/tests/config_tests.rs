//! Configuration resolution tests
//!
//! Tests that touch VODCAT_* environment variables are marked #[serial]
//! so they never run in parallel with each other.

use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use vodcat_common::config::{
    default_database_path, load_toml_config, resolve_database_path, ConfigResolver, LoggingConfig,
    TomlConfig, CONFIG_ENV, DATABASE_ENV,
};
use vodcat_common::logging::env_filter;
use vodcat_common::{Error, KeyScheme};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_defaults() {
    let config = TomlConfig::default();
    assert!(config.database.is_none());
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.catalog.key_scheme, KeyScheme::Indexed);
    assert!(config.catalog.tables.is_empty());
    assert!(default_database_path().ends_with("vodcat/catalog.db"));
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
database = "/srv/vodcat/catalog.db"

[logging]
level = "debug"

[catalog]
key_scheme = "named"

[catalog.tables]
basic_nage = "BasicNageModel-1A2B"
goshin = "GoshinModel-3C4D"
"#,
    );

    let config = load_toml_config(file.path()).unwrap();
    assert_eq!(config.database, Some(PathBuf::from("/srv/vodcat/catalog.db")));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.catalog.key_scheme, KeyScheme::Named);
    assert_eq!(
        config.catalog.tables.get("goshin").map(String::as_str),
        Some("GoshinModel-3C4D")
    );
}

#[test]
fn test_partial_config_keeps_defaults() {
    let file = write_config("[logging]\nlevel = \"warn\"\n");
    let config = load_toml_config(file.path()).unwrap();
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.catalog.key_scheme, KeyScheme::Indexed);
}

#[test]
fn test_invalid_config_is_error() {
    let file = write_config("[catalog]\nkey_scheme = \"numbered\"\n");
    assert!(matches!(load_toml_config(file.path()), Err(Error::Config(_))));

    let file = write_config("unknown_key = 1\n");
    assert!(matches!(load_toml_config(file.path()), Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_cli_path_beats_environment() {
    let cli = write_config("[logging]\nlevel = \"trace\"\n");
    let from_env = write_config("[logging]\nlevel = \"error\"\n");
    env::set_var(CONFIG_ENV, from_env.path());

    let config = ConfigResolver::new(Some(cli.path().to_path_buf())).load().unwrap();
    assert_eq!(config.logging.level, "trace");

    let config = ConfigResolver::new(None).load().unwrap();
    assert_eq!(config.logging.level, "error");

    env::remove_var(CONFIG_ENV);
}

#[test]
#[serial]
fn test_explicit_missing_file_is_error() {
    env::remove_var(CONFIG_ENV);
    let resolver = ConfigResolver::new(Some(PathBuf::from("/nonexistent/vodcat/config.toml")));
    assert!(matches!(resolver.load(), Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_database_path_priority() {
    env::remove_var(DATABASE_ENV);
    let mut config = TomlConfig::default();

    assert_eq!(resolve_database_path(None, &config), default_database_path());

    config.database = Some(PathBuf::from("/from/toml.db"));
    assert_eq!(resolve_database_path(None, &config), PathBuf::from("/from/toml.db"));

    env::set_var(DATABASE_ENV, "/from/env.db");
    assert_eq!(resolve_database_path(None, &config), PathBuf::from("/from/env.db"));

    assert_eq!(
        resolve_database_path(Some(Path::new("/from/cli.db")), &config),
        PathBuf::from("/from/cli.db")
    );

    env::remove_var(DATABASE_ENV);
}

#[test]
#[serial]
fn test_env_filter_falls_back_to_configured_level() {
    env::remove_var("RUST_LOG");
    let filter = env_filter(&LoggingConfig::default()).unwrap();
    assert_eq!(filter.to_string(), "info");

    let filter = env_filter(&LoggingConfig {
        level: "vodcat_ingest=debug".to_string(),
    })
    .unwrap();
    assert_eq!(filter.to_string(), "vodcat_ingest=debug");
}
