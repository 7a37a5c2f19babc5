//! Key-value storage port and the typed access layer on top of it.
//!
//! The port is deliberately minimal: raw string get/set/delete over a
//! persistent local namespace. Every call is an independent, synchronous,
//! all-or-nothing operation; there are no transactions and no batching.
//!
//! [`Storage`] wraps a port with JSON (de)serialization and the failure
//! policy the rest of the engine relies on: reads swallow corruption and
//! return the caller's fallback, writes report failure without panicking,
//! deletes log and move on. Nothing here is fatal to the process.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Failure persisting to or removing from the namespace (e.g., quota
/// exceeded, disk error).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage namespace lock poisoned")]
    Poisoned,
}

/// Raw string namespace. Implementations must be synchronous.
pub trait KeyValueStore: Send + Sync {
    /// The stored text for `key`, if any.
    fn get_raw(&self, key: &str) -> Option<String>;

    /// Persist `value` under `key`.
    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn delete_raw(&self, key: &str) -> Result<(), StoreError>;
}

/// Typed, failure-swallowing handle over a [`KeyValueStore`].
#[derive(Clone)]
pub struct Storage {
    inner: Arc<dyn KeyValueStore>,
}

impl Storage {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    /// Parsed value under `key`, or `fallback` when absent or corrupt.
    ///
    /// A parse failure is never raised to the caller: a corrupt record is
    /// treated exactly like an absent one. Normalization downstream is
    /// what guarantees usable data, not the store.
    pub fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.inner.get_raw(key) {
            None => fallback,
            Some(text) => match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(err) => {
                    tracing::debug!(key, error = %err, "corrupt record, using fallback");
                    fallback
                }
            },
        }
    }

    /// Raw JSON tree under `key`, for callers that normalize themselves.
    pub fn get_value(&self, key: &str) -> Option<Value> {
        let text = self.inner.get_raw(key)?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!(key, error = %err, "corrupt record, treating as absent");
                None
            }
        }
    }

    /// Serialize and persist. Returns false on failure; the caller keeps
    /// working with its in-memory state for that operation.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(key, error = %err, "serialization failed, record not persisted");
                return false;
            }
        };
        match self.inner.set_raw(key, &text) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(key, error = %err, "write failed, record not persisted");
                false
            }
        }
    }

    /// Remove a record. Failure is logged, never propagated.
    pub fn delete(&self, key: &str) {
        if let Err(err) = self.inner.delete_raw(key) {
            tracing::warn!(key, error = %err, "delete failed");
        }
    }
}

/// Storage keys for the profile namespace.
pub mod keys {
    pub const PROFILES: &str = "lorebook_profiles";
    pub const ACTIVE_PROFILE: &str = "lorebook_active_profile";

    /// Pre-profiles schema keys, read once by the legacy migration.
    pub const LEGACY_DRAFT: &str = "log";
    pub const LEGACY_INVENTORY: &str = "inv";

    /// Per-profile data key.
    pub fn profile_data(id: &str) -> String {
        format!("lorebook_profile_{id}")
    }
}
