use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{SnapshotStore, StorageError};

/// In-memory snapshot store.
///
/// Clones share the same map, so a test can hand one handle to an
/// `AccountStore` and keep another to inspect or reuse what was saved.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    snapshots: Rc<RefCell<HashMap<String, String>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw snapshot, e.g. to simulate a corrupt file
    pub fn insert(&self, key: &str, data: &str) {
        self.snapshots
            .borrow_mut()
            .insert(key.to_string(), data.to_string());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.snapshots.borrow().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.snapshots.borrow().contains_key(key)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    fn save(&mut self, key: &str, data: &str) -> Result<(), StorageError> {
        self.insert(key, data);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        self.snapshots.borrow_mut().remove(key);
        Ok(())
    }
}
