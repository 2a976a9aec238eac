//! Offline cache for site assets
//!
//! SQLite-backed response storage grouped into versioned generations, and a
//! cache-first gateway that serves from it.

pub mod gateway;
pub mod key;
pub mod lifecycle;
pub mod storage;

/// Root document, the last-resort fallback for offline navigations
pub const ROOT_DOCUMENT: &str = "/index.html";

// Re-export main types
pub use gateway::{GatewaySettings, Intercept, ResponseSource, Served};
pub use key::cache_key;
pub use lifecycle::{DeployStatus, deploy};
pub use storage::{CacheStorage, SharedStorage, lock_storage};
