// Snapshot persistence
// The account store is saved as a single serialized snapshot under a fixed
// key. This module defines the storage port and its two adapters.

mod memory;
mod schema;
mod sqlite;

pub use memory::MemorySnapshotStore;
pub use schema::create_schema;
pub use sqlite::SqliteSnapshotStore;

/// Storage error types
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key-value store holding whole-store snapshots
#[cfg_attr(test, mockall::automock)]
pub trait SnapshotStore {
    /// Load the snapshot stored under `key`, if any
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the snapshot stored under `key`
    fn save(&mut self, key: &str, data: &str) -> Result<(), StorageError>;

    /// Remove the snapshot stored under `key`. Missing keys are not an error.
    fn delete(&mut self, key: &str) -> Result<(), StorageError>;
}
