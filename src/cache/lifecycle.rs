//! Install and activation of cache generations
//!
//! A new generation is only promoted once its precache manifest is stored in
//! full. Until then the previous generation keeps serving.

use std::sync::Arc;

use crate::cache::gateway::{CacheGateway, GatewaySettings};
use crate::cache::storage::{SharedStorage, lock_storage};
use crate::client::Network;
use crate::error::Result;

/// What `deploy` did to reach a serving gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployStatus {
    /// The configured generation was already active
    Current,
    /// The configured generation was installed and older ones purged
    Activated { precached: usize, purged: Vec<String> },
    /// Install failed; the previously active generation still serves
    InstallFailed { reason: String, serving: String },
}

/// A gateway ready to serve, plus how it got there
pub struct Deployment<N: Network> {
    pub gateway: CacheGateway<N>,
    pub status: DeployStatus,
}

/// Bring the configured generation into control.
///
/// If it is already active nothing is fetched. Otherwise its manifest is
/// installed and it is activated. When install fails and an older generation
/// exists, that one is returned still serving; with no older generation the
/// install error is returned.
pub async fn deploy<N: Network + 'static>(
    network: Arc<N>,
    storage: SharedStorage,
    settings: GatewaySettings,
) -> Result<Deployment<N>> {
    let previous = lock_storage(&storage)?.active_version()?;

    if previous.as_deref() == Some(settings.cache_name.as_str()) {
        log::debug!("Cache {} already active", settings.cache_name);
        return Ok(Deployment {
            gateway: CacheGateway::new(network, storage, settings),
            status: DeployStatus::Current,
        });
    }

    let candidate = CacheGateway::new(network.clone(), storage.clone(), settings.clone());
    match candidate.install().await {
        Ok(precached) => {
            let purged = candidate.activate()?;
            Ok(Deployment {
                gateway: candidate,
                status: DeployStatus::Activated { precached, purged },
            })
        }
        Err(e) => match previous {
            Some(serving) => {
                log::warn!(
                    "Install of {} failed, {} keeps serving: {}",
                    settings.cache_name,
                    serving,
                    e
                );
                Ok(Deployment {
                    gateway: CacheGateway::new(
                        network,
                        storage,
                        settings.with_cache_name(&serving),
                    ),
                    status: DeployStatus::InstallFailed {
                        reason: e.to_string(),
                        serving,
                    },
                })
            }
            None => Err(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStorage;
    use crate::client::{MockNetwork, Request, Response};
    use crate::cache::gateway::{Intercept, ResponseSource};
    use reqwest::Url;
    use std::sync::Mutex;

    const ORIGIN: &str = "http://localhost:5173";

    fn settings(version: &str) -> GatewaySettings {
        GatewaySettings {
            origin: Url::parse(ORIGIN).unwrap(),
            cache_name: version.to_string(),
            offline_url: "/offline.html".to_string(),
            precache: vec!["/".to_string(), "/script.js".to_string()],
        }
    }

    fn url(path: &str) -> Url {
        Url::parse(ORIGIN).unwrap().join(path).unwrap()
    }

    async fn site(script: &str) -> MockNetwork {
        MockNetwork::new()
            .with_response(&format!("{ORIGIN}/"), Response::ok("<html></html>"))
            .await
            .with_response(&format!("{ORIGIN}/script.js"), Response::ok(script))
            .await
    }

    #[tokio::test]
    async fn test_first_deploy_installs_and_activates() {
        let network = Arc::new(site("v1 script").await);
        let storage = Arc::new(Mutex::new(CacheStorage::open_in_memory().unwrap()));

        let deployment = deploy(network, storage.clone(), settings("v1")).await.unwrap();

        assert_eq!(
            deployment.status,
            DeployStatus::Activated {
                precached: 2,
                purged: vec![]
            }
        );
        assert_eq!(deployment.gateway.version(), "v1");
        assert_eq!(
            storage.lock().unwrap().active_version().unwrap().as_deref(),
            Some("v1")
        );
    }

    #[tokio::test]
    async fn test_redeploy_same_version_fetches_nothing() {
        let network = Arc::new(site("v1 script").await);
        let storage = Arc::new(Mutex::new(CacheStorage::open_in_memory().unwrap()));
        deploy(network.clone(), storage.clone(), settings("v1")).await.unwrap();
        let calls_before = network.calls().await.len();

        let deployment = deploy(network.clone(), storage, settings("v1")).await.unwrap();

        assert_eq!(deployment.status, DeployStatus::Current);
        assert_eq!(network.calls().await.len(), calls_before);
    }

    #[tokio::test]
    async fn test_new_version_purges_old() {
        let network = Arc::new(site("v1 script").await);
        let storage = Arc::new(Mutex::new(CacheStorage::open_in_memory().unwrap()));
        deploy(network.clone(), storage.clone(), settings("v1")).await.unwrap();

        network
            .set_response(&format!("{ORIGIN}/script.js"), Response::ok("v2 script"))
            .await;
        let deployment = deploy(network, storage.clone(), settings("v2")).await.unwrap();

        assert_eq!(
            deployment.status,
            DeployStatus::Activated {
                precached: 2,
                purged: vec!["v1".to_string()]
            }
        );
        let s = storage.lock().unwrap();
        assert_eq!(s.cache_names().unwrap(), vec!["v2"]);
        let script = s.match_url("v2", &url("/script.js")).unwrap().unwrap();
        assert_eq!(script.text(), "v2 script");
    }

    #[tokio::test]
    async fn test_failed_install_keeps_old_version_serving() {
        let network = Arc::new(site("v1 script").await);
        let storage = Arc::new(Mutex::new(CacheStorage::open_in_memory().unwrap()));
        deploy(network.clone(), storage.clone(), settings("v1")).await.unwrap();

        let mut next = settings("v2");
        next.precache.push("/missing.css".to_string());
        let deployment = deploy(network.clone(), storage.clone(), next).await.unwrap();

        match &deployment.status {
            DeployStatus::InstallFailed { reason, serving } => {
                assert_eq!(serving, "v1");
                assert!(reason.contains("missing.css"));
            }
            other => panic!("Expected InstallFailed, got {:?}", other),
        }
        assert_eq!(deployment.gateway.version(), "v1");
        assert_eq!(
            storage.lock().unwrap().active_version().unwrap().as_deref(),
            Some("v1")
        );

        network.set_offline(true);
        match deployment.gateway.handle(&Request::get(url("/script.js"))).await {
            Intercept::Respond(served) => {
                assert_eq!(served.source, ResponseSource::Cache);
                assert_eq!(served.response.text(), "v1 script");
            }
            Intercept::Passthrough => panic!("Expected a cached response"),
        }
    }

    #[tokio::test]
    async fn test_failed_first_install_is_an_error() {
        let network = Arc::new(MockNetwork::new());
        network.set_offline(true);
        let storage = Arc::new(Mutex::new(CacheStorage::open_in_memory().unwrap()));

        let result = deploy(network, storage.clone(), settings("v1")).await;

        assert!(result.is_err());
        let s = storage.lock().unwrap();
        assert!(s.active_version().unwrap().is_none());
        assert!(s.cache_names().unwrap().is_empty());
    }
}
