//! Versioned key-value storage for the MiSub console server.
//!
//! Every collection the server manages is stored as one JSON document under a
//! single key and replaced whole on each write. To make read-modify-write
//! cycles safe, each stored value carries a [`Version`] that increases on
//! every write, and [`KvStore::compare_and_swap`] only writes when the caller
//! saw the latest version.
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local map, used when no data directory is
//!   configured and throughout the tests
//! - [`RocksStore`]: `RocksDB`, one `kv` column family, CBOR-encoded records
//!
//! # Example
//!
//! ```
//! use misub_store::{keys, KvStore, MemoryStore};
//! use serde_json::json;
//!
//! let store = MemoryStore::new();
//! let v1 = store.put(keys::PROFILES, &json!([])).unwrap();
//!
//! // A writer holding the current version wins...
//! let v2 = store
//!     .compare_and_swap(keys::PROFILES, Some(v1), &json!([{"id": "p1"}]))
//!     .unwrap();
//! assert!(v2 > v1);
//!
//! // ...and a writer holding a stale one is rejected.
//! let stale = store.compare_and_swap(keys::PROFILES, Some(v1), &json!([]));
//! assert!(stale.unwrap_err().is_conflict());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod memory;
pub mod rocks;
pub mod schema;
pub mod types;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use rocks::RocksStore;
pub use types::NodeGroup;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Monotonic write counter attached to every stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    /// The version assigned to the first write of a key.
    pub const INITIAL: Self = Self(1);

    /// The version that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The raw counter value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The version written after `current`, or [`Version::INITIAL`] for a new key.
    #[must_use]
    pub fn after(current: Option<Self>) -> Self {
        current.map_or(Self::INITIAL, Self::next)
    }
}

/// A stored value together with the version it was written at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned {
    /// Version of this value.
    pub version: Version,
    /// The stored JSON document.
    pub value: Value,
}

/// The storage trait the control plane is written against.
///
/// Writes replace the whole value under a key. There are no multi-key
/// transactions.
pub trait KvStore: Send + Sync {
    /// Short backend name for diagnostics.
    fn backend(&self) -> &'static str;

    /// Read a value and its version.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get(&self, key: &str) -> Result<Option<Versioned>>;

    /// Unconditionally replace the value under `key`.
    ///
    /// Last writer wins. Returns the version that was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put(&self, key: &str, value: &Value) -> Result<Version>;

    /// Replace the value under `key` only if its current version is `expected`.
    ///
    /// `None` means the key must not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if another write happened in between.
    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<Version>,
        value: &Value,
    ) -> Result<Version>;

    /// Read just the value, dropping the version.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_value(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.get(key)?.map(|stored| stored.value))
    }
}
