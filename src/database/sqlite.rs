use chrono::Utc;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::{schema, SnapshotStore, StorageError};

/// Snapshot store backed by a single SQLite table
pub struct SqliteSnapshotStore {
    conn: Connection,
}

impl SqliteSnapshotStore {
    /// Open (or create) the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();

        // Create directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db_exists = path.exists();
        let conn = Connection::open(path)?;

        if db_exists {
            debug!("Using existing database at {}", path.display());
        } else {
            info!("Creating new database at {}", path.display());
        }

        Self::with_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(mut conn: Connection) -> Result<Self, StorageError> {
        schema::create_schema(&mut conn)?;
        Ok(Self { conn })
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let data = self
            .conn
            .query_row(
                "SELECT data FROM snapshots WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(data)
    }

    fn save(&mut self, key: &str, data: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO snapshots (key, data, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
            params![key, data, Utc::now().to_rfc3339()],
        )?;

        debug!("Saved snapshot '{}' ({} bytes)", key, data.len());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        let removed = self
            .conn
            .execute("DELETE FROM snapshots WHERE key = ?1", params![key])?;

        debug!("Deleted snapshot '{}' ({} row(s))", key, removed);
        Ok(())
    }
}
