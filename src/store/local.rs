//! Persistent key-value storage
//!
//! A small SQLite table with a per-value quota, standing in for the
//! browser's `localStorage`.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::StorageError;

/// Database file inside the data directory
const DB_FILE: &str = "local.db";

type Result<T> = std::result::Result<T, StorageError>;

/// String key-value storage used to persist the workout list
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// SQLite-backed local storage
pub struct LocalStorage {
    conn: Connection,
    quota_bytes: usize,
}

impl LocalStorage {
    /// Open or create local storage in `data_dir`
    pub fn open_at(data_dir: &Path, quota_bytes: usize) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .map_err(|e| StorageError::Io(format!("Failed to create data dir: {}", e)))?;

        let conn = Connection::open(data_dir.join(DB_FILE))?;
        Self::init(conn, quota_bytes)
    }

    #[cfg(test)]
    pub fn open_in_memory(quota_bytes: usize) -> Result<Self> {
        Self::init(Connection::open_in_memory()?, quota_bytes)
    }

    fn init(conn: Connection, quota_bytes: usize) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS local_storage (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );
            "#,
        )?;

        Ok(Self { conn, quota_bytes })
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                [key],
                |r| r.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let size = key.len() + value.len();
        if size > self.quota_bytes {
            return Err(StorageError::QuotaExceeded {
                size,
                limit: self.quota_bytes,
            });
        }

        self.conn.execute(
            "INSERT OR REPLACE INTO local_storage (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
pub use memory::MemoryStorage;
