//! Configuration loading and database path resolution
//!
//! Config file lookup priority:
//! 1. Command-line argument
//! 2. `VODCAT_CONFIG` environment variable
//! 3. `~/.config/vodcat/config.toml`, then `/etc/vodcat/config.toml`
//! 4. Compiled defaults (no file)
//!
//! An explicitly named file (1 or 2) must exist. A missing file at the
//! default locations is not an error: a warning is logged and compiled
//! defaults apply.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::catalog::KeyScheme;
use crate::{Error, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "VODCAT_CONFIG";

/// Environment variable naming the catalog database
pub const DATABASE_ENV: &str = "VODCAT_DATABASE";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TomlConfig {
    /// Catalog database file
    pub database: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub catalog: CatalogConfig,
}

/// `[logging]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `[catalog]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub key_scheme: KeyScheme,
    /// Optional exact-match directory: category name → table
    pub tables: BTreeMap<String, String>,
}

/// Locates and loads the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Path of the config file to load, if any
    pub fn config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.cli_path {
            return Some(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        default_config_locations().into_iter().find(|p| p.exists())
    }

    /// Load the config, falling back to compiled defaults when no file exists
    pub fn load(&self) -> Result<TomlConfig> {
        match self.config_path() {
            Some(path) => {
                let config = load_toml_config(&path)?;
                info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            None => {
                warn!("No configuration file found, using compiled defaults");
                Ok(TomlConfig::default())
            }
        }
    }
}

/// Parse a config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config {}: {}", path.display(), e)))
}

/// Default config file locations, most specific first
fn default_config_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("vodcat").join("config.toml"));
    }
    if cfg!(unix) {
        locations.push(PathBuf::from("/etc/vodcat/config.toml"));
    }
    locations
}

/// Catalog database path: CLI > `VODCAT_DATABASE` > TOML > platform default
pub fn resolve_database_path(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATABASE_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.database {
        return path.clone();
    }

    default_database_path()
}

/// Platform data directory default: `<data dir>/vodcat/catalog.db`
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("vodcat"))
        .unwrap_or_else(|| PathBuf::from("./vodcat_data"))
        .join("catalog.db")
}
