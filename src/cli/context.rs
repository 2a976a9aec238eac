//! Command execution context
//!
//! Loads configuration once and hands out the storages and network client
//! commands need.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::cache::{CacheStorage, GatewaySettings, SharedStorage};
use crate::cli::{GlobalOptions, OutputFormat};
use crate::client::HttpNetwork;
use crate::config::Config;
use crate::error::Result;
use crate::store::{LocalStorage, WorkoutStore};

/// Context for command execution.
pub struct CommandContext {
    /// Loaded and validated configuration
    pub config: Config,
    /// Output format preference
    pub format: OutputFormat,
    /// Directory holding `local.db` and `cache.db`
    pub data_dir: PathBuf,
}

impl CommandContext {
    /// Load config (defaults when the file is missing) and resolve the data
    /// directory from flag, config or platform default.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = Config::load_at(opts.config_ref())?;
        let data_dir = config.resolve_data_dir(opts.data_dir_ref())?;
        log::debug!("Using data directory {}", data_dir.display());

        Ok(Self {
            config,
            format: opts.format,
            data_dir,
        })
    }

    /// Open the workout list
    pub fn workouts(&self) -> Result<WorkoutStore<LocalStorage>> {
        let storage = LocalStorage::open_at(&self.data_dir, self.config.storage_quota_bytes)?;
        Ok(WorkoutStore::load(storage))
    }

    /// Open the asset cache for sharing with background refreshes
    pub fn cache_storage(&self) -> Result<SharedStorage> {
        let storage = CacheStorage::open_at(&self.data_dir)?;
        Ok(Arc::new(Mutex::new(storage)))
    }

    pub fn network(&self) -> Result<Arc<HttpNetwork>> {
        let timeout = self.config.request_timeout_secs.map(Duration::from_secs);
        Ok(Arc::new(HttpNetwork::new(timeout)?))
    }

    pub fn gateway_settings(&self) -> Result<GatewaySettings> {
        GatewaySettings::from_config(&self.config)
    }
}
