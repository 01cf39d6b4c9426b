//! SQLite-based key-value storage.
//!
//! Provides persistent storage for:
//! - The task buckets, as one JSON blob
//! - User profile entries (name, audio preference)

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{params, Connection};

use crate::error::StorageError;

use super::data_dir;

/// String key-value persistence.
///
/// The seam between task/profile code and whatever holds the bytes.
/// `Database` is the durable implementation; `MemoryKv` backs tests and
/// the degraded mode used when the database cannot be opened.
pub trait KvStore {
    /// Get a value, `None` if the key was never written.
    ///
    /// # Errors
    /// Returns an error if the underlying store fails.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Set a value, replacing any previous one.
    ///
    /// # Errors
    /// Returns an error if the underlying store fails.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// SQLite database holding the kv table.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/tickdown/tickdown.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("tickdown.db");
        let conn = Connection::open(&path).map_err(|source| StorageError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        // Concurrent invocations (a watch loop plus one-shot commands)
        // share the file; wait briefly instead of failing on a lock.
        conn.busy_timeout(Duration::from_secs(5))?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))
    }
}

impl KvStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Mutex-guarded map with the same interface as the database.
///
/// Used as the fallback when the on-disk store is unavailable: the
/// session keeps working, nothing is persisted.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
