//! Cache-first gateway in front of the network
//!
//! Answers same-origin GETs from the active cache generation, refreshing hits
//! in the background, and degrades to an offline page or a 503 when neither
//! cache nor network can serve.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use reqwest::{Method, Url};
use tokio::task::JoinHandle;

use crate::cache::storage::{SharedStorage, lock_storage};
use crate::cache::{ROOT_DOCUMENT, cache_key};
use crate::client::{Network, Request, Response};
use crate::config::Config;
use crate::error::{CacheError, ConfigError, Result};

/// Where an answered response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// Served from the cache; a background refresh may be running
    Cache,
    /// Fetched from the network (and cached if it was a 200)
    Network,
    /// Network failed; served the offline or root document
    Fallback,
    /// Network failed and nothing usable was cached
    Unavailable,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Cache => "cache",
            ResponseSource::Network => "network",
            ResponseSource::Fallback => "fallback",
            ResponseSource::Unavailable => "unavailable",
        }
    }
}

/// A response the gateway produced for an intercepted request
#[derive(Debug, Clone)]
pub struct Served {
    pub response: Response,
    pub source: ResponseSource,
}

/// Outcome of offering a request to the gateway
#[derive(Debug, Clone)]
pub enum Intercept {
    /// Not ours (non-GET or cross-origin); the caller should go to the network
    Passthrough,
    Respond(Served),
}

/// Static gateway settings derived from configuration
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub origin: Url,
    /// Generation tag entries are read from and written to
    pub cache_name: String,
    pub offline_url: String,
    /// Precache manifest paths
    pub precache: Vec<String>,
}

impl GatewaySettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        let origin = Url::parse(&config.origin)
            .map_err(|e| ConfigError::Invalid(format!("origin '{}': {}", config.origin, e)))?;

        Ok(Self {
            origin,
            cache_name: config.cache_version.clone(),
            offline_url: config.offline_url.clone(),
            precache: config.precache.clone(),
        })
    }

    /// Same settings bound to another generation
    pub fn with_cache_name(&self, cache_name: &str) -> Self {
        Self {
            cache_name: cache_name.to_string(),
            ..self.clone()
        }
    }

    /// Resolve a path (or absolute URL) against the origin
    pub fn resolve(&self, target: &str) -> Result<Url> {
        self.origin
            .join(target)
            .map_err(|e| ConfigError::Invalid(format!("'{}': {}", target, e)).into())
    }

    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin.origin()
    }

    /// Only same-origin GETs go through the cache
    pub fn intercepts(&self, request: &Request) -> bool {
        request.method == Method::GET && self.is_same_origin(&request.url)
    }

    /// Manifest paths resolved to URLs
    pub fn precache_urls(&self) -> Result<Vec<Url>> {
        self.precache.iter().map(|p| self.resolve(p)).collect()
    }
}

/// Cache-first gateway for one cache generation.
///
/// Cloning is cheap; clones share storage and the in-flight refresh table.
pub struct CacheGateway<N: Network> {
    network: Arc<N>,
    storage: SharedStorage,
    settings: GatewaySettings,
    /// Background refreshes by cache key. A live entry suppresses new
    /// refreshes of the same URL.
    refreshes: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
}

impl<N: Network> Clone for CacheGateway<N> {
    fn clone(&self) -> Self {
        Self {
            network: self.network.clone(),
            storage: self.storage.clone(),
            settings: self.settings.clone(),
            refreshes: self.refreshes.clone(),
        }
    }
}

impl<N: Network + 'static> CacheGateway<N> {
    pub fn new(network: Arc<N>, storage: SharedStorage, settings: GatewaySettings) -> Self {
        Self {
            network,
            storage,
            settings,
            refreshes: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Generation tag this gateway serves
    pub fn version(&self) -> &str {
        &self.settings.cache_name
    }

    /// Fetch the precache manifest and store it under this generation.
    ///
    /// All assets must come back as 200 before anything is written; a single
    /// failure leaves storage untouched.
    pub async fn install(&self) -> Result<usize> {
        log::info!("Installing cache {}", self.version());

        let urls = self.settings.precache_urls()?;
        let fetches = urls.into_iter().map(|url| async move {
            let request = Request::get(url.clone());
            match self.network.fetch(&request).await {
                Ok(response) if response.is_ok() => Ok((url, response)),
                Ok(response) => Err(CacheError::Precache {
                    url: url.to_string(),
                    reason: format!("HTTP {}", response.status),
                }),
                Err(e) => Err(CacheError::Precache {
                    url: url.to_string(),
                    reason: e.to_string(),
                }),
            }
        });

        let entries = futures::future::try_join_all(fetches).await?;
        lock_storage(&self.storage)?.put_all(self.version(), &entries)?;

        log::info!("Precached {} assets into {}", entries.len(), self.version());
        Ok(entries.len())
    }

    /// Make this generation the active one, deleting every other generation.
    /// Returns the names of the purged caches.
    pub fn activate(&self) -> Result<Vec<String>> {
        let storage = lock_storage(&self.storage)?;

        let mut purged = Vec::new();
        for name in storage.cache_names()? {
            if name != self.version() {
                let removed = storage.delete_cache(&name)?;
                log::info!("Deleted old cache {} ({} entries)", name, removed);
                purged.push(name);
            }
        }
        storage.set_active_version(self.version())?;

        log::info!("Activated cache {}", self.version());
        Ok(purged)
    }

    /// Decide how to answer `request`. Never fails: every failure degrades
    /// to a fallback response.
    pub async fn handle(&self, request: &Request) -> Intercept {
        if !self.settings.intercepts(request) {
            log::debug!("Passing through {} {}", request.method, request.url);
            return Intercept::Passthrough;
        }

        if let Some(cached) = self.lookup(&request.url) {
            log::debug!("Cache hit: {}", request.url);
            self.revalidate(request);
            return Intercept::Respond(Served {
                response: cached,
                source: ResponseSource::Cache,
            });
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    store(&self.storage, self.version(), &request.url, &response);
                }
                Intercept::Respond(Served {
                    response,
                    source: ResponseSource::Network,
                })
            }
            Err(e) => {
                log::error!("Fetch failed for {}: {}", request.url, e);
                Intercept::Respond(self.fallback(request))
            }
        }
    }

    /// Wait for background refreshes started so far
    pub async fn settle(&self) {
        let pending: Vec<JoinHandle<()>> = {
            let mut refreshes = self.refreshes.lock().unwrap_or_else(|e| e.into_inner());
            refreshes.drain().map(|(_, handle)| handle).collect()
        };

        for result in futures::future::join_all(pending).await {
            if let Err(e) = result {
                log::debug!("Background refresh task ended abnormally: {}", e);
            }
        }
    }

    fn lookup(&self, url: &Url) -> Option<Response> {
        let storage = match lock_storage(&self.storage) {
            Ok(storage) => storage,
            Err(e) => {
                log::warn!("Cache lookup skipped: {}", e);
                return None;
            }
        };
        match storage.match_url(self.version(), url) {
            Ok(found) => found,
            Err(e) => {
                log::warn!("Cache lookup failed for {}: {}", url, e);
                None
            }
        }
    }

    /// Stale-while-revalidate: refetch in a detached task and overwrite the
    /// entry on a 200. Failures only reach the debug log.
    fn revalidate(&self, request: &Request) {
        let key = cache_key(&request.url);
        let mut refreshes = self.refreshes.lock().unwrap_or_else(|e| e.into_inner());

        if refreshes.get(&key).is_some_and(|h| !h.is_finished()) {
            log::debug!("Refresh already in flight for {}", request.url);
            return;
        }

        let network = self.network.clone();
        let storage = self.storage.clone();
        let cache_name = self.version().to_string();
        let request = request.clone();

        let handle = tokio::spawn(async move {
            match network.fetch(&request).await {
                Ok(response) if response.is_ok() => {
                    if superseded(&storage, &cache_name) {
                        log::debug!(
                            "Dropping refresh of {}: {} is no longer active",
                            request.url,
                            cache_name
                        );
                        return;
                    }
                    store(&storage, &cache_name, &request.url, &response);
                    log::debug!("Refreshed {}", request.url);
                }
                Ok(response) => {
                    log::debug!(
                        "Refresh of {} returned {}, keeping cached copy",
                        request.url,
                        response.status
                    );
                }
                Err(e) => {
                    log::debug!("Background refresh failed for {}: {}", request.url, e);
                }
            }
        });
        refreshes.insert(key, handle);
    }

    fn fallback(&self, request: &Request) -> Served {
        if request.is_navigation() {
            for path in [self.settings.offline_url.as_str(), ROOT_DOCUMENT] {
                let Ok(url) = self.settings.resolve(path) else {
                    continue;
                };
                if let Some(document) = self.lookup(&url) {
                    return Served {
                        response: document,
                        source: ResponseSource::Fallback,
                    };
                }
            }
        }

        Served {
            response: Response::unavailable(),
            source: ResponseSource::Unavailable,
        }
    }
}

/// Best-effort cache write; failures are logged and dropped
fn store(storage: &SharedStorage, cache_name: &str, url: &Url, response: &Response) {
    let result = lock_storage(storage).and_then(|s| s.put(cache_name, url, response));
    if let Err(e) = result {
        log::warn!("Failed to cache {}: {}", url, e);
    }
}

/// True once another generation has been activated over `cache_name`
fn superseded(storage: &SharedStorage, cache_name: &str) -> bool {
    match lock_storage(storage).and_then(|s| s.active_version()) {
        Ok(Some(active)) => active != cache_name,
        Ok(None) => false,
        Err(e) => {
            log::warn!("Failed to read active cache version: {}", e);
            false
        }
    }
}
