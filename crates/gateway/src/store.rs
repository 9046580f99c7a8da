//! Persistent client state store.
//!
//! The browser apps kept session tokens, the cart, and payment receipts in
//! `localStorage`. This module is the typed replacement: a small synchronous
//! key/value abstraction that callers inject wherever client state is needed,
//! with an in-memory implementation for tests and ephemeral sessions and a
//! JSON-file implementation for persistence across runs.
//!
//! The store itself does not validate stored shapes; callers serialize, and
//! malformed stored data is treated as absent.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Well-known keys shared by the gateway and storefront clients.
///
/// Both API surfaces read and write one store instance, so the names live in
/// a single place.
pub mod keys {
    /// Short-lived JWT access token.
    pub const ACCESS_TOKEN: &str = "accessToken";

    /// Longer-lived JWT refresh token.
    pub const REFRESH_TOKEN: &str = "refreshToken";

    /// Cached profile of the logged-in user (JSON).
    pub const USER: &str = "user";

    /// Shopping cart line items (JSON array).
    pub const CART: &str = "cart";

    /// In-flight order snapshot, kept for recovery across a redirect (JSON).
    pub const CURRENT_ORDER: &str = "current_order";

    /// Receipt of the most recent successful payment (JSON).
    pub const LAST_PAYMENT: &str = "last_payment";
}

/// Errors that can occur when persisting state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Synchronous key/value storage for client state.
///
/// `get` returns `None` both for missing keys and for values the caller
/// cannot decode; `set`/`remove` surface persistence failures.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value for `key`, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key` if present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the removal cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Read and decode a JSON value; malformed stored data is treated as absent.
#[must_use]
pub fn get_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    serde_json::from_str(&raw).ok()
}

/// Encode and write a JSON value.
///
/// # Errors
///
/// Returns [`StoreError`] if serialization or persistence fails.
pub fn set_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_owned(), value.to_owned());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
        Ok(())
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// JSON-file-backed store, the production binding.
///
/// The whole map is rewritten on every mutation via a temp-file rename, so a
/// crash mid-write never leaves a truncated state file. A missing or corrupt
/// file on open is treated as an empty store, matching the "malformed data is
/// absent" contract.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// Open (or create) the store backed by `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let entries = Self::load(&path);
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    fn load(path: &Path) -> HashMap<String, String> {
        fs::read_to_string(path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let Ok(mut entries) = self.entries.write() else {
            return Ok(());
        };
        entries.insert(key.to_owned(), value.to_owned());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let Ok(mut entries) = self.entries.write() else {
            return Ok(());
        };
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("missing").is_none());

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));

        store.remove("k").unwrap();
        assert!(store.get("k").is_none());
    }

    #[test]
    fn test_json_helpers_treat_malformed_as_absent() {
        let store = MemoryStore::new();
        store.set(keys::USER, "{not json").unwrap();
        assert!(get_json::<Profile>(&store, keys::USER).is_none());

        let profile = Profile { name: "Abebe".into() };
        set_json(&store, keys::USER, &profile).unwrap();
        assert_eq!(get_json::<Profile>(&store, keys::USER), Some(profile));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.set(keys::ACCESS_TOKEN, "abc").unwrap();
            store.set(keys::REFRESH_TOKEN, "def").unwrap();
            store.remove(keys::REFRESH_TOKEN).unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(keys::ACCESS_TOKEN).as_deref(), Some("abc"));
        assert!(reopened.get(keys::REFRESH_TOKEN).is_none());
    }

    #[test]
    fn test_file_store_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "][ definitely not json").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert!(store.get(keys::ACCESS_TOKEN).is_none());
    }
}
