//! SQLite-based cache storage grouped by generation
//!
//! Every entry belongs to a named cache (the generation tag). Generations are
//! only ever dropped whole.

use chrono::Utc;
use reqwest::Url;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::cache::cache_key;
use crate::client::Response;
use crate::error::CacheError;

/// Schema version - increment to trigger nuke-and-rebuild
const SCHEMA_VERSION: i32 = 1;

/// Database file inside the data directory
pub const DB_FILE: &str = "cache.db";

/// `cache_meta` key holding the active generation tag
const ACTIVE_VERSION_KEY: &str = "active_version";

type Result<T> = std::result::Result<T, CacheError>;

/// Storage handle shared between the gateway and its refresh tasks
pub type SharedStorage = Arc<Mutex<CacheStorage>>;

/// Lock shared storage, surfacing poisoning as an error
pub fn lock_storage(storage: &SharedStorage) -> Result<MutexGuard<'_, CacheStorage>> {
    storage.lock().map_err(|_| CacheError::Poisoned)
}

/// SQLite-backed response cache
pub struct CacheStorage {
    conn: Connection,
}

impl CacheStorage {
    /// Open or create cache storage in `data_dir`
    pub fn open_at(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .map_err(|e| CacheError::Io(format!("Failed to create cache dir: {}", e)))?;

        let db_path = data_dir.join(DB_FILE);
        let conn = Connection::open(&db_path)?;

        // Check schema version - nuke if mismatched
        let version: i32 = conn
            .pragma_query_value(None, "user_version", |r| r.get(0))
            .unwrap_or(0);

        if version != 0 && version != SCHEMA_VERSION {
            log::info!(
                "Cache schema version mismatch ({} != {}), rebuilding",
                version,
                SCHEMA_VERSION
            );
            drop(conn);
            std::fs::remove_file(&db_path)
                .map_err(|e| CacheError::Io(format!("Failed to remove cache DB: {}", e)))?;
            return Self::open_at(data_dir);
        }

        Self::init(conn)
    }

    /// Open a throwaway in-memory cache
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                cache_name TEXT NOT NULL,
                cache_key TEXT NOT NULL,
                url TEXT NOT NULL,
                status INTEGER NOT NULL,
                status_text TEXT NOT NULL,
                headers TEXT NOT NULL,
                body BLOB NOT NULL,
                stored_at INTEGER NOT NULL,
                size_bytes INTEGER NOT NULL,
                PRIMARY KEY (cache_name, cache_key)
            );

            CREATE INDEX IF NOT EXISTS idx_cache_name ON cache_entries(cache_name);

            CREATE TABLE IF NOT EXISTS cache_meta (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );
            "#,
        )?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(Self { conn })
    }

    /// Look up the snapshot stored for `url` in one generation
    pub fn match_url(&self, cache_name: &str, url: &Url) -> Result<Option<Response>> {
        let key = cache_key(url);

        let row: Option<(u16, String, String, Vec<u8>)> = self
            .conn
            .query_row(
                "SELECT status, status_text, headers, body FROM cache_entries
                 WHERE cache_name = ?1 AND cache_key = ?2",
                params![cache_name, key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        match row {
            Some((status, status_text, headers, body)) => {
                let headers = serde_json::from_str(&headers)
                    .map_err(|e| CacheError::Corrupt(format!("{}: {}", url, e)))?;
                Ok(Some(Response {
                    status,
                    status_text,
                    headers,
                    body,
                }))
            }
            None => Ok(None),
        }
    }

    /// Store (or overwrite) the snapshot for `url`
    pub fn put(&self, cache_name: &str, url: &Url, response: &Response) -> Result<()> {
        Self::insert(&self.conn, cache_name, url, response)
    }

    /// Store several snapshots atomically; either all land or none do
    pub fn put_all(&self, cache_name: &str, entries: &[(Url, Response)]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (url, response) in entries {
            Self::insert(&tx, cache_name, url, response)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn insert(conn: &Connection, cache_name: &str, url: &Url, response: &Response) -> Result<()> {
        let headers = serde_json::to_string(&response.headers)
            .map_err(|e| CacheError::Corrupt(format!("{}: {}", url, e)))?;

        conn.execute(
            "INSERT OR REPLACE INTO cache_entries
             (cache_name, cache_key, url, status, status_text, headers, body, stored_at, size_bytes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                cache_name,
                cache_key(url),
                url.as_str(),
                response.status,
                response.status_text,
                headers,
                response.body,
                Utc::now().timestamp(),
                response.body.len()
            ],
        )?;
        Ok(())
    }

    /// Names of every generation holding at least one entry
    pub fn cache_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT cache_name FROM cache_entries ORDER BY cache_name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Drop a whole generation, returning the number of entries removed
    pub fn delete_cache(&self, cache_name: &str) -> Result<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM cache_entries WHERE cache_name = ?1", [cache_name])?;
        Ok(deleted)
    }

    /// Number of entries in one generation
    pub fn entry_count(&self, cache_name: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM cache_entries WHERE cache_name = ?1",
            [cache_name],
            |r| r.get(0),
        )?;
        Ok(count as usize)
    }

    /// The generation currently in control, if any has been activated
    pub fn active_version(&self) -> Result<Option<String>> {
        let version = self
            .conn
            .query_row(
                "SELECT value FROM cache_meta WHERE key = ?1",
                [ACTIVE_VERSION_KEY],
                |r| r.get(0),
            )
            .optional()?;
        Ok(version)
    }

    pub fn set_active_version(&self, cache_name: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO cache_meta (key, value) VALUES (?1, ?2)",
            params![ACTIVE_VERSION_KEY, cache_name],
        )?;
        Ok(())
    }

    /// Clear every generation and forget the active one
    pub fn clear_all(&self) -> Result<ClearStats> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM cache_entries", [], |r| r.get(0))?;

        self.conn.execute("DELETE FROM cache_entries", [])?;
        self.conn.execute("DELETE FROM cache_meta", [])?;

        Ok(ClearStats {
            entries_removed: count as usize,
        })
    }

    /// Get cache statistics
    pub fn stats(&self) -> Result<CacheStats> {
        let total_entries: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM cache_entries", [], |r| r.get(0))?;

        let total_size: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(size_bytes), 0) FROM cache_entries",
            [],
            |r| r.get(0),
        )?;

        let (oldest, newest): (Option<i64>, Option<i64>) = self.conn.query_row(
            "SELECT MIN(stored_at), MAX(stored_at) FROM cache_entries",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;

        let mut stmt = self.conn.prepare(
            "SELECT cache_name, COUNT(*) FROM cache_entries GROUP BY cache_name ORDER BY cache_name",
        )?;
        let generations = stmt
            .query_map([], |row| {
                let count: i64 = row.get(1)?;
                Ok((row.get::<_, String>(0)?, count as usize))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(CacheStats {
            total_entries: total_entries as usize,
            total_size_bytes: total_size as usize,
            generations,
            active_version: self.active_version()?,
            oldest_entry: oldest,
            newest_entry: newest,
        })
    }
}

/// Statistics about cache clear operation
#[derive(Debug)]
pub struct ClearStats {
    pub entries_removed: usize,
}

/// Statistics about cache state
#[derive(Debug)]
pub struct CacheStats {
    pub total_entries: usize,
    pub total_size_bytes: usize,
    /// Entry count per generation
    pub generations: Vec<(String, usize)>,
    pub active_version: Option<String>,
    pub oldest_entry: Option<i64>,
    pub newest_entry: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_storage() -> (CacheStorage, TempDir) {
        let dir = TempDir::new().unwrap();
        let storage = CacheStorage::open_at(dir.path()).unwrap();
        (storage, dir)
    }

    fn url(path: &str) -> Url {
        Url::parse("http://localhost:5173").unwrap().join(path).unwrap()
    }

    #[test]
    fn test_put_and_match() {
        let (storage, _dir) = test_storage();
        let response = Response::ok("body {}").with_header("content-type", "text/css");

        storage.put("v1", &url("/style.css"), &response).unwrap();

        let cached = storage.match_url("v1", &url("/style.css")).unwrap();
        assert_eq!(cached, Some(response));
    }

    #[test]
    fn test_match_is_scoped_to_generation() {
        let (storage, _dir) = test_storage();
        storage.put("v1", &url("/"), &Response::ok("old")).unwrap();

        assert!(storage.match_url("v2", &url("/")).unwrap().is_none());
    }

    #[test]
    fn test_put_overwrites() {
        let (storage, _dir) = test_storage();
        storage.put("v1", &url("/script.js"), &Response::ok("a")).unwrap();
        storage.put("v1", &url("/script.js"), &Response::ok("b")).unwrap();

        let cached = storage.match_url("v1", &url("/script.js")).unwrap().unwrap();
        assert_eq!(cached.text(), "b");
        assert_eq!(storage.entry_count("v1").unwrap(), 1);
    }

    #[test]
    fn test_put_all_and_delete_cache() {
        let (storage, _dir) = test_storage();
        let entries = vec![
            (url("/"), Response::ok("root")),
            (url("/index.html"), Response::ok("index")),
        ];
        storage.put_all("v1", &entries).unwrap();
        storage.put("v2", &url("/"), &Response::ok("new")).unwrap();

        assert_eq!(storage.cache_names().unwrap(), vec!["v1", "v2"]);
        assert_eq!(storage.delete_cache("v1").unwrap(), 2);
        assert_eq!(storage.cache_names().unwrap(), vec!["v2"]);
    }

    #[test]
    fn test_active_version_round_trip() {
        let (storage, _dir) = test_storage();
        assert_eq!(storage.active_version().unwrap(), None);

        storage.set_active_version("pitchside-v2").unwrap();
        storage.set_active_version("pitchside-v3").unwrap();
        assert_eq!(
            storage.active_version().unwrap().as_deref(),
            Some("pitchside-v3")
        );
    }

    #[test]
    fn test_clear_all() {
        let (storage, _dir) = test_storage();
        storage.put("v1", &url("/a"), &Response::ok("1")).unwrap();
        storage.put("v1", &url("/b"), &Response::ok("2")).unwrap();
        storage.set_active_version("v1").unwrap();

        let stats = storage.clear_all().unwrap();
        assert_eq!(stats.entries_removed, 2);
        assert!(storage.cache_names().unwrap().is_empty());
        assert!(storage.active_version().unwrap().is_none());
    }

    #[test]
    fn test_stats() {
        let (storage, _dir) = test_storage();
        storage.put("v1", &url("/a"), &Response::ok("data1")).unwrap();
        storage.put("v2", &url("/a"), &Response::ok("data2")).unwrap();
        storage.put("v2", &url("/b"), &Response::ok("data3")).unwrap();
        storage.set_active_version("v2").unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.total_size_bytes, 15);
        assert_eq!(
            stats.generations,
            vec![("v1".to_string(), 1), ("v2".to_string(), 2)]
        );
        assert_eq!(stats.active_version.as_deref(), Some("v2"));
        assert!(stats.oldest_entry.is_some());
    }

    #[test]
    fn test_reopen_keeps_entries() {
        let dir = TempDir::new().unwrap();
        {
            let storage = CacheStorage::open_at(dir.path()).unwrap();
            storage.put("v1", &url("/"), &Response::ok("root")).unwrap();
        }
        let storage = CacheStorage::open_at(dir.path()).unwrap();
        assert!(storage.match_url("v1", &url("/")).unwrap().is_some());
    }
}
