//! Error types for pitchside

use thiserror::Error;

/// Result type alias for pitchside operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No workouts to export")]
    NothingToExport,

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// Rejections of a submitted workout. Nothing is stored when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a workout type")]
    MissingType,

    #[error("Please enter a valid duration")]
    InvalidDuration,

    #[error("Intensity must be between 1 and 10")]
    InvalidIntensity,
}

/// Network failures while fetching a resource
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Request timed out")]
    Timeout,

    #[error("Failed to connect to {0}")]
    Connect(String),

    #[error("Network error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout
        } else if err.is_connect() {
            let host = err
                .url()
                .and_then(|u| u.host_str())
                .unwrap_or("server")
                .to_string();
            NetworkError::Connect(host)
        } else {
            NetworkError::Other(err.to_string())
        }
    }
}

/// Cache storage and lifecycle errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(String),

    #[error("Cache database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Cache storage is unavailable")]
    Poisoned,

    #[error("Corrupt cache entry: {0}")]
    Corrupt(String),

    #[error("Precache of {url} failed: {reason}")]
    Precache { url: String, reason: String },
}

/// Local key-value storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(String),

    #[error("Storage database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage quota exceeded ({size} bytes, limit {limit} bytes)")]
    QuotaExceeded { size: usize, limit: usize },
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
