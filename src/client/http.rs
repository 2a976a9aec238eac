//! reqwest-backed network implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;

use super::{FetchResult, Network, Request, Response};
use crate::error::{NetworkError, Result};

/// HTTP network client
#[derive(Clone)]
pub struct HttpNetwork {
    http: HttpClient,
}

impl HttpNetwork {
    /// Create a client. `timeout` of `None` leaves timing to the platform.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = HttpClient::builder()
            .user_agent(concat!("pitchside/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(NetworkError::from)?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> FetchResult {
        log::debug!("{} {}", request.method, request.url);

        let response = self
            .http
            .request(request.method.clone(), request.url.clone())
            .send()
            .await?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}
