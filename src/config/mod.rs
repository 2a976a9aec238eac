//! Configuration management for pitchside

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Cache generation bundled with this build
pub const DEFAULT_CACHE_VERSION: &str = "pitchside-v2";

/// Document served to navigations when the network and cache both miss
pub const DEFAULT_OFFLINE_URL: &str = "/offline.html";

/// Site origin used until `pitchside init` is run
pub const DEFAULT_ORIGIN: &str = "http://localhost:5173";

/// Per-value limit for local storage, matching common browser quotas
pub const DEFAULT_STORAGE_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Assets required for offline bootstrap
pub const DEFAULT_PRECACHE: &[&str] = &[
    "/",
    "/index.html",
    "/style.css",
    "/script.js",
    "/manifest.json",
];

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Origin of the tracker site, e.g. `https://tracker.example.com`
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Cache generation tag. Changing it invalidates every cached asset.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Offline fallback document path
    #[serde(default = "default_offline_url")]
    pub offline_url: String,

    /// Precache manifest (paths relative to the origin)
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Optional HTTP timeout; unset means no client-side timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Override for the data directory holding `cache.db` and `local.db`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Maximum size of one local storage value
    #[serde(default = "default_storage_quota")]
    pub storage_quota_bytes: usize,
}

fn default_origin() -> String {
    DEFAULT_ORIGIN.to_string()
}

fn default_cache_version() -> String {
    DEFAULT_CACHE_VERSION.to_string()
}

fn default_offline_url() -> String {
    DEFAULT_OFFLINE_URL.to_string()
}

fn default_precache() -> Vec<String> {
    DEFAULT_PRECACHE.iter().map(|p| p.to_string()).collect()
}

fn default_storage_quota() -> usize {
    DEFAULT_STORAGE_QUOTA_BYTES
}

impl Default for Config {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            cache_version: default_cache_version(),
            offline_url: default_offline_url(),
            precache: default_precache(),
            request_timeout_secs: None,
            data_dir: None,
            storage_quota_bytes: default_storage_quota(),
        }
    }
}

impl Config {
    /// Get the default config file path (~/.pitchside/config.yaml)
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".pitchside").join("config.yaml"))
    }

    /// Resolve an optional override into the config file path
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration, falling back to defaults when no file exists
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(&Self::resolve_path(path)?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to the resolved path
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(&Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Check the fields that later stages rely on
    pub fn validate(&self) -> Result<()> {
        let origin = reqwest::Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid(format!("origin '{}': {}", self.origin, e)))?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "origin '{}' must use http or https",
                self.origin
            ))
            .into());
        }
        if self.cache_version.trim().is_empty() {
            return Err(ConfigError::Invalid("cache_version must not be empty".to_string()).into());
        }
        if !self.offline_url.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "offline_url '{}' must be an absolute path",
                self.offline_url
            ))
            .into());
        }
        Ok(())
    }

    /// Resolve the data directory: explicit override, then config, then XDG data dir
    pub fn resolve_data_dir(&self, flag: Option<&str>) -> Result<PathBuf> {
        if let Some(dir) = flag {
            return Ok(PathBuf::from(dir));
        }
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let base = dirs::data_dir().ok_or(ConfigError::Invalid(
            "Could not determine data directory".to_string(),
        ))?;
        Ok(base.join("pitchside"))
    }
}
