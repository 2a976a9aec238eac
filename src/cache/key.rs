//! Cache key generation using SHA-256 hashes

use reqwest::Url;
use sha2::{Digest, Sha256};

/// Generate a deterministic cache key for a request URL.
///
/// The fragment never reaches the server, so it is dropped before hashing;
/// `/index.html#top` and `/index.html` share an entry.
pub fn cache_key(url: &Url) -> String {
    let mut normalized = url.clone();
    normalized.set_fragment(None);

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_str().as_bytes());

    format!("{:x}", hasher.finalize())
}
