use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

use super::error::RatesError;

fn default_base() -> String {
    "USD".to_string()
}

fn default_history_folder() -> PathBuf {
    PathBuf::from("./history")
}

fn default_history_collection() -> String {
    "history".to_string()
}

fn default_provider_url() -> String {
    "https://openexchangerates.org/api".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_url")]
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: default_provider_url(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RatesConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_base")]
    pub base: String,
    #[serde(default = "default_history_folder")]
    pub history_folder: PathBuf,
    #[serde(default = "default_history_collection")]
    pub history_collection: String,
    /// Directory of the embedded database. Without it the history folder is
    /// the authoritative cache.
    pub database_path: Option<PathBuf>,
    pub update_interval_ms: Option<i64>,
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl Default for RatesConfig {
    fn default() -> Self {
        RatesConfig {
            api_key: None,
            base: default_base(),
            history_folder: default_history_folder(),
            history_collection: default_history_collection(),
            database_path: None,
            update_interval_ms: None,
            provider: ProviderConfig::default(),
        }
    }
}

impl RatesConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "xrates", "xrates")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn api_key(&self) -> Result<&str, RatesError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(RatesError::MissingCredential)
    }

    /// Refresh period of the latest table, `None` when disabled.
    pub fn update_interval(&self) -> Option<Duration> {
        self.update_interval_ms
            .filter(|ms| *ms > 0)
            .map(|ms| Duration::from_millis(ms as u64))
    }
}
