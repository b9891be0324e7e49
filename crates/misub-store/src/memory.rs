//! In-memory storage implementation.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::{KvStore, Version, Versioned};

/// Process-local [`KvStore`] backed by a hash map.
///
/// Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Versioned>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KvStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<Versioned>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &Value) -> Result<Version> {
        let mut entries = self.entries.write();
        let version = Version::after(entries.get(key).map(|stored| stored.version));
        entries.insert(
            key.to_string(),
            Versioned {
                version,
                value: value.clone(),
            },
        );
        Ok(version)
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<Version>,
        value: &Value,
    ) -> Result<Version> {
        let mut entries = self.entries.write();
        let actual = entries.get(key).map(|stored| stored.version);
        if actual != expected {
            return Err(StoreError::Conflict {
                key: key.to_string(),
                expected,
                actual,
            });
        }

        let version = Version::after(actual);
        entries.insert(
            key.to_string(),
            Versioned {
                version,
                value: value.clone(),
            },
        );
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_key_reads_none() {
        let store = MemoryStore::new();
        assert!(store.get("nope").unwrap().is_none());
        assert!(store.get_value("nope").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn put_bumps_version() {
        let store = MemoryStore::new();
        let v1 = store.put("k", &json!([1])).unwrap();
        let v2 = store.put("k", &json!([1, 2])).unwrap();
        assert_eq!(v1, Version::INITIAL);
        assert_eq!(v2, v1.next());

        let stored = store.get("k").unwrap().unwrap();
        assert_eq!(stored.version, v2);
        assert_eq!(stored.value, json!([1, 2]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn cas_on_absent_key() {
        let store = MemoryStore::new();
        let v1 = store.compare_and_swap("k", None, &json!({})).unwrap();
        assert_eq!(v1, Version::INITIAL);

        // A second "create" from the same empty snapshot must lose.
        let err = store.compare_and_swap("k", None, &json!({})).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Conflict {
                expected: None,
                actual: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn stale_cas_leaves_value_untouched() {
        let store = MemoryStore::new();
        let v1 = store.put("k", &json!(["a"])).unwrap();
        store.compare_and_swap("k", Some(v1), &json!(["a", "b"])).unwrap();

        let err = store
            .compare_and_swap("k", Some(v1), &json!(["a", "c"]))
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.get_value("k").unwrap().unwrap(), json!(["a", "b"]));
    }

    #[test]
    fn put_ignores_versions() {
        // Blind writes are last-writer-wins.
        let store = MemoryStore::new();
        store.put("k", &json!(["first"])).unwrap();
        store.put("k", &json!(["second"])).unwrap();
        assert_eq!(store.get_value("k").unwrap().unwrap(), json!(["second"]));
    }
}
