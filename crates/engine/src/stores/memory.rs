//! In-memory store - the test double, and the backing for ephemeral
//! sessions.

use std::collections::HashMap;
use std::sync::Mutex;

use super::kv::{KeyValueStore, StoreError};

/// HashMap-backed namespace. The mutex is interior mutability behind
/// `&self`, not cross-thread coordination; the core is single-threaded.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records (test inspection helper).
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete_raw(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_delete_cycle() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set_raw("a", "1").expect("write");
        assert_eq!(store.get_raw("a").as_deref(), Some("1"));
        assert_eq!(store.len(), 1);

        store.set_raw("a", "2").expect("overwrite");
        assert_eq!(store.get_raw("a").as_deref(), Some("2"));

        store.delete_raw("a").expect("delete");
        assert!(store.get_raw("a").is_none());
        assert!(store.is_empty());
    }
}
