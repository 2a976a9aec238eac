//! Cache and fetch display models

use serde::Serialize;
use tabled::Tabled;

use crate::cache::Served;
use crate::cache::storage::CacheStats;
use crate::output::formatters::format_size;

/// One cache generation row
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct GenerationDisplay {
    #[tabled(rename = "CACHE")]
    pub name: String,

    #[tabled(rename = "ENTRIES")]
    pub entries: usize,

    #[tabled(skip)]
    pub active: bool,

    #[tabled(rename = "ACTIVE")]
    #[serde(skip)]
    pub marker: String,
}

impl GenerationDisplay {
    pub fn from_stats(stats: &CacheStats) -> Vec<Self> {
        stats
            .generations
            .iter()
            .map(|(name, entries)| {
                let active = stats.active_version.as_deref() == Some(name.as_str());
                Self {
                    name: name.clone(),
                    entries: *entries,
                    active,
                    marker: if active { "✓".to_string() } else { String::new() },
                }
            })
            .collect()
    }
}

/// JSON payload of `pitchside cache status`
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatusDisplay {
    pub path: String,
    pub configured_version: String,
    pub active_version: Option<String>,
    pub total_entries: usize,
    pub total_size_bytes: usize,
    pub total_size_human: String,
    pub oldest_entry_timestamp: Option<i64>,
    pub newest_entry_timestamp: Option<i64>,
    pub generations: Vec<GenerationDisplay>,
}

impl CacheStatusDisplay {
    pub fn new(path: String, configured_version: &str, stats: &CacheStats) -> Self {
        Self {
            path,
            configured_version: configured_version.to_string(),
            active_version: stats.active_version.clone(),
            total_entries: stats.total_entries,
            total_size_bytes: stats.total_size_bytes,
            total_size_human: format_size(stats.total_size_bytes),
            oldest_entry_timestamp: stats.oldest_entry,
            newest_entry_timestamp: stats.newest_entry,
            generations: GenerationDisplay::from_stats(stats),
        }
    }
}

/// Summary of a fetched resource
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct FetchDisplay {
    #[tabled(rename = "URL")]
    pub url: String,

    #[tabled(rename = "STATUS")]
    pub status: u16,

    #[tabled(rename = "TEXT")]
    pub status_text: String,

    #[tabled(rename = "SOURCE")]
    pub source: String,

    #[tabled(skip)]
    pub size_bytes: usize,

    #[tabled(rename = "SIZE")]
    #[serde(skip)]
    pub size: String,

    #[tabled(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[tabled(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl FetchDisplay {
    pub fn new(url: &str, served: &Served) -> Self {
        let response = &served.response;
        Self {
            url: url.to_string(),
            status: response.status,
            status_text: response.status_text.clone(),
            source: served.source.as_str().to_string(),
            size_bytes: response.body.len(),
            size: format_size(response.body.len()),
            content_type: response.header("content-type").map(str::to_string),
            body: None,
        }
    }

    /// Include the body as text (lossy for binary content)
    pub fn with_body(mut self, served: &Served) -> Self {
        self.body = Some(served.response.text().into_owned());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResponseSource;
    use crate::client::Response;

    fn stats() -> CacheStats {
        CacheStats {
            total_entries: 7,
            total_size_bytes: 2048,
            generations: vec![("pitchside-v1".to_string(), 2), ("pitchside-v2".to_string(), 5)],
            active_version: Some("pitchside-v2".to_string()),
            oldest_entry: Some(1_700_000_000),
            newest_entry: Some(1_700_000_100),
        }
    }

    #[test]
    fn test_generation_rows_mark_active() {
        let rows = GenerationDisplay::from_stats(&stats());
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].active);
        assert!(rows[1].active);
        assert_eq!(rows[1].entries, 5);
    }

    #[test]
    fn test_cache_status_display() {
        let display = CacheStatusDisplay::new("/data/cache.db".to_string(), "pitchside-v2", &stats());
        assert_eq!(display.total_size_human, "2.00 KB");
        assert_eq!(display.active_version.as_deref(), Some("pitchside-v2"));
        assert_eq!(display.generations.len(), 2);
    }

    #[test]
    fn test_fetch_display() {
        let served = Served {
            response: Response::unavailable(),
            source: ResponseSource::Unavailable,
        };

        let display = FetchDisplay::new("http://localhost:5173/logo.png", &served).with_body(&served);

        assert_eq!(display.status, 503);
        assert_eq!(display.source, "unavailable");
        assert_eq!(display.size_bytes, 7);
        assert_eq!(display.body.as_deref(), Some("Offline"));
        assert_eq!(display.content_type.as_deref(), Some("text/plain; charset=utf-8"));
    }
}
