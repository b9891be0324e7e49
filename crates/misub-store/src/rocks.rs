//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `KvStore` trait.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rocksdb::{BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, MultiThreaded, Options};
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::schema::{all_column_families, cf};
use crate::{KvStore, Version, Versioned};

/// RocksDB-backed storage implementation.
///
/// Records are CBOR-encoded [`Versioned`] values. Writes go through a single
/// mutex so the version check and the write of a compare-and-swap cannot
/// interleave with another writer in this process.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a record using CBOR.
    fn serialize(record: &Versioned) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(record, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a record from CBOR.
    fn deserialize(data: &[u8]) -> Result<Versioned> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn write(&self, key: &str, version: Version, value: &Value) -> Result<Version> {
        let cf = self.cf(cf::KV)?;
        let record = Versioned {
            version,
            value: value.clone(),
        };
        let bytes = Self::serialize(&record)?;

        self.db
            .put_cf(&cf, key.as_bytes(), bytes)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::debug!(key = %key, version = version.get(), "Wrote record");
        Ok(version)
    }
}

impl KvStore for RocksStore {
    fn backend(&self) -> &'static str {
        "rocksdb"
    }

    fn get(&self, key: &str) -> Result<Option<Versioned>> {
        let cf = self.cf(cf::KV)?;

        self.db
            .get_cf(&cf, key.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn put(&self, key: &str, value: &Value) -> Result<Version> {
        let _guard = self.write_lock.lock();
        let current = self.get(key)?.map(|stored| stored.version);
        self.write(key, Version::after(current), value)
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<Version>,
        value: &Value,
    ) -> Result<Version> {
        let _guard = self.write_lock.lock();
        let actual = self.get(key)?.map(|stored| stored.version);
        if actual != expected {
            return Err(StoreError::Conflict {
                key: key.to_string(),
                expected,
                actual,
            });
        }
        self.write(key, Version::after(actual), value)
    }
}
