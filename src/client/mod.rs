//! Network access for site resources

use async_trait::async_trait;

use crate::error::NetworkError;

pub mod http;
#[cfg(test)]
pub mod mock;
pub mod models;

pub use http::HttpNetwork;
#[cfg(test)]
#[allow(unused_imports)]
pub use mock::MockNetwork;
pub use models::{Request, Response};

/// Result of a single network round trip.
///
/// Any HTTP status counts as a successful fetch; only transport failures
/// are errors.
pub type FetchResult = std::result::Result<Response, NetworkError>;

/// Something that can fetch a resource over the network
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request and snapshot the full response
    async fn fetch(&self, request: &Request) -> FetchResult;
}
