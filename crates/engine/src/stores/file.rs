//! File-backed store - a single JSON file holding the whole namespace.
//!
//! Every write persists the entire namespace synchronously, mirroring the
//! all-or-nothing per-call contract of the port. There is exactly one
//! writer (this process), so last-writer-wins with no locking is
//! acceptable; concurrent access from a second process is a known hazard,
//! not mitigated.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::kv::{KeyValueStore, StoreError};

/// JSON-file-backed namespace.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or create) the namespace file at `path`.
    ///
    /// A corrupt file starts the namespace empty with a warning rather
    /// than failing: the tracker must never brick the user's data on
    /// load. The corrupt content is replaced on the next write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<BTreeMap<String, String>>(&text) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err,
                        "namespace file corrupt, starting empty");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(StoreError::Io(err)),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(entries)
            .map_err(|err| StoreError::Io(std::io::Error::other(err)))?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn delete_raw(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        self.persist(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("namespace.json");

        {
            let store = FileStore::open(&path).expect("open");
            store.set_raw("k", "\"v\"").expect("write");
        }

        let store = FileStore::open(&path).expect("reopen");
        assert_eq!(store.get_raw("k").as_deref(), Some("\"v\""));
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::open(dir.path().join("fresh.json")).expect("open");
        assert!(store.get_raw("anything").is_none());
    }

    #[test]
    fn corrupt_file_starts_empty_instead_of_failing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("namespace.json");
        fs::write(&path, "{{{{ not json").expect("seed corrupt file");

        let store = FileStore::open(&path).expect("open survives corruption");
        assert!(store.get_raw("k").is_none());

        store.set_raw("k", "\"v\"").expect("write repairs the file");
        let reopened = FileStore::open(&path).expect("reopen");
        assert_eq!(reopened.get_raw("k").as_deref(), Some("\"v\""));
    }

    #[test]
    fn delete_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("namespace.json");

        let store = FileStore::open(&path).expect("open");
        store.set_raw("k", "1").expect("write");
        store.delete_raw("k").expect("delete");

        let reopened = FileStore::open(&path).expect("reopen");
        assert!(reopened.get_raw("k").is_none());
    }
}
