//! Application configuration management.
//!
//! This module handles loading and saving the configuration, which holds the
//! login API URL, the token store backend, and the last used username.
//!
//! Configuration is stored at `~/.config/loginkit/config.json`. The
//! `LOGINKIT_API_URL` environment variable overrides the stored API URL.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_TIMEOUT_SECS;
use crate::api::ApiClient;
use crate::auth::{FileStore, KeyValueStore, KeyringStore, MemoryStore};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "loginkit";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the API URL
pub const API_URL_ENV: &str = "LOGINKIT_API_URL";

/// API root used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/login";

/// Where the token lives between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    File,
    Keyring,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "keyring" => Ok(Self::Keyring),
            other => Err(anyhow::anyhow!(
                "Unknown store backend '{}' (expected memory, file or keyring)",
                other
            )),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Keyring => "keyring",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    #[serde(default)]
    pub store: StoreBackend,
    pub last_username: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .context("Failed to read config file")?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// API URL: environment, then config file, then the default
    pub fn api_url(&self) -> String {
        Self::resolve_api_url(std::env::var(API_URL_ENV).ok(), self.api_url.as_deref())
    }

    fn resolve_api_url(env: Option<String>, configured: Option<&str>) -> String {
        env.filter(|url| !url.trim().is_empty())
            .or_else(|| configured.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn api_client(&self) -> Result<ApiClient> {
        ApiClient::with_timeout(self.api_url(), self.timeout())
            .context("Failed to build HTTP client")
    }

    /// Open the configured token store backend
    pub fn open_store(&self) -> Result<Box<dyn KeyValueStore>> {
        let store: Box<dyn KeyValueStore> = match self.store {
            StoreBackend::Memory => Box::new(MemoryStore::new()),
            StoreBackend::File => Box::new(FileStore::in_dir(&self.cache_dir()?)),
            StoreBackend::Keyring => Box::new(KeyringStore::new()),
        };
        Ok(store)
    }
}
