// src/config.rs
//! Configuration file parsing for rpmcat
//!
//! Supports a TOML configuration file with the following sections:
//! - [database] - Catalogue location
//! - [import] - Batch import behaviour
//! - [query] - Query defaults
//!
//! Command-line flags take precedence over everything here.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "/etc/rpmcat.toml";

/// Catalogue used when neither flag nor config names one
pub const DEFAULT_DB_PATH: &str = "/var/lib/rpmcat/catalog.db";

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseSection,

    #[serde(default)]
    pub import: ImportSection,

    #[serde(default)]
    pub query: QuerySection,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseSection {
    /// Path of the SQLite catalogue
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportSection {
    /// Draw a progress bar during batch imports
    #[serde(default = "default_true")]
    pub progress: bool,
}

impl Default for ImportSection {
    fn default() -> Self {
        Self { progress: true }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuerySection {
    /// Tag applied to queries that do not pass `--tag`
    #[serde(default)]
    pub default_tag: Option<String>,
}

impl Config {
    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the explicitly requested file, or the default file if present
    ///
    /// A missing default file yields the built-in defaults; a missing
    /// explicit file is an error.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.database.path.as_os_str().is_empty() {
            bail!("database.path must not be empty");
        }
        if let Some(tag) = &self.query.default_tag
            && tag.trim().is_empty()
        {
            bail!("query.default_tag must not be empty when set");
        }
        Ok(())
    }
}
