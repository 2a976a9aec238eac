//! Mock network for testing
//!
//! Serves canned responses by URL and can be switched offline mid-test.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{FetchResult, Network, Request, Response};
use crate::error::NetworkError;

/// Mock network for testing.
///
/// # Example
/// ```ignore
/// let network = MockNetwork::new()
///     .with_response("http://localhost:5173/style.css", Response::ok("body {}"))
///     .await;
/// network.set_offline(true);
/// ```
#[derive(Default)]
pub struct MockNetwork {
    /// Responses keyed by full URL string
    routes: Arc<Mutex<HashMap<String, Response>>>,
    /// URLs that fail with a transport error even when online
    broken: Arc<Mutex<Vec<String>>>,
    /// When set, every fetch fails to connect
    offline: AtomicBool,
    /// Artificial latency applied before answering
    delay: Arc<Mutex<Option<Duration>>>,
    /// Every URL fetched, in order
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `response` for `url`
    pub async fn with_response(self, url: &str, response: Response) -> Self {
        self.routes.lock().await.insert(url.to_string(), response);
        self
    }

    /// Fail every fetch of `url` with a transport error
    pub async fn with_broken(self, url: &str) -> Self {
        self.broken.lock().await.push(url.to_string());
        self
    }

    /// Delay every answer by `delay`
    pub async fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().await = Some(delay);
        self
    }

    /// Replace the response for `url` after construction
    pub async fn set_response(&self, url: &str, response: Response) {
        self.routes.lock().await.insert(url.to_string(), response);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// All URLs fetched so far
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    /// Number of fetches of one URL
    pub async fn call_count(&self, url: &str) -> usize {
        self.calls.lock().await.iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &Request) -> FetchResult {
        let url = request.url.to_string();
        self.calls.lock().await.push(url.clone());

        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.offline.load(Ordering::SeqCst) || self.broken.lock().await.contains(&url) {
            return Err(NetworkError::Connect(
                request.url.host_str().unwrap_or("localhost").to_string(),
            ));
        }

        Ok(self
            .routes
            .lock()
            .await
            .get(&url)
            .cloned()
            .unwrap_or_else(|| Response::new(404, "Not Found", "Not Found")))
    }
}
