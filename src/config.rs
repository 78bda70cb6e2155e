//! Application configuration management.
//!
//! Settings are layered with figment: built-in defaults, then
//! `config.toml` in the platform config directory, then `APOD_*`
//! environment variables. Command-line flags are applied on top by the
//! caller.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{CacheSettings, DEFAULT_DB_FILE};
use crate::provider::nasa::{DEFAULT_API_URL, DEMO_API_KEY};
use crate::provider::ProviderSettings;

/// Prefix of environment variables that override configuration keys.
pub const ENV_PREFIX: &str = "APOD_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cache root; defaults to `images/` under the platform data directory.
    pub cache_dir: Option<PathBuf>,
    /// Database file name inside the cache root.
    pub db_file: String,
    /// APOD API key.
    pub api_key: String,
    /// APOD API endpoint.
    pub api_url: String,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// Whether to apply the cached image as the desktop background.
    pub set_background: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: None,
            db_file: DEFAULT_DB_FILE.to_string(),
            api_key: DEMO_API_KEY.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            set_background: true,
        }
    }
}

impl Config {
    /// Load the configuration from the default platform-specific path.
    ///
    /// Falls back to defaults if the configuration cannot be read.
    pub fn load() -> Self {
        match Self::load_from(Self::config_path().as_deref()) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Load the configuration from an explicit TOML file (if any) and the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source contains values of the wrong type.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let config = Self::figment(path)
            .extract()
            .context("Invalid configuration")?;
        Ok(config)
    }

    /// The layered figment: defaults < TOML file < environment.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Cache locations derived from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no cache directory is configured and the platform
    /// data directory cannot be determined.
    pub fn cache_settings(&self) -> Result<CacheSettings> {
        let root = match &self.cache_dir {
            Some(dir) => dir.clone(),
            None => project_dirs()
                .map(|dirs| dirs.data_dir().join("images"))
                .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?,
        };
        let db_path = root.join(&self.db_file);
        Ok(CacheSettings { root, db_path })
    }

    /// Provider connection settings.
    #[must_use]
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "apod-desktop", "apod-desktop")
}
