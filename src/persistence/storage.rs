//! Graph-level property storage
//!
//! Constraint definitions live in a single graph property. [`PropertyStore`]
//! is the host capability the persister needs: keyed reads, and atomic
//! multi-key writes. Two implementations are provided, an in-memory map and
//! a RocksDB column family.

use crate::graph::PropertyValue;
use rocksdb::{ColumnFamilyDescriptor, Options, WriteBatch, DB};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{debug, info};

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// RocksDB error
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Column family error
    #[error("Column family error: {0}")]
    ColumnFamily(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A set of property writes applied together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBatch {
    writes: Vec<(String, Option<PropertyValue>)>,
}

impl PropertyBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a write of `value` under `key`
    pub fn set(&mut self, key: impl Into<String>, value: PropertyValue) -> &mut Self {
        self.writes.push((key.into(), Some(value)));
        self
    }

    /// Queue a removal of `key`
    pub fn remove(&mut self, key: impl Into<String>) -> &mut Self {
        self.writes.push((key.into(), None));
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Writes in queue order; `None` is a removal
    pub fn into_writes(self) -> Vec<(String, Option<PropertyValue>)> {
        self.writes
    }
}

/// Keyed graph-property access
pub trait PropertyStore: Send + Sync {
    /// Read a property; `None` when the key is absent
    fn get(&self, key: &str) -> StorageResult<Option<PropertyValue>>;

    /// Apply every write in the batch, or none of them
    fn commit(&self, batch: PropertyBatch) -> StorageResult<()>;
}

impl<S: PropertyStore + ?Sized> PropertyStore for Arc<S> {
    fn get(&self, key: &str) -> StorageResult<Option<PropertyValue>> {
        (**self).get(key)
    }

    fn commit(&self, batch: PropertyBatch) -> StorageResult<()> {
        (**self).commit(batch)
    }
}

/// In-memory property store
#[derive(Debug, Default)]
pub struct MemoryPropertyStore {
    properties: RwLock<HashMap<String, PropertyValue>>,
}

impl MemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.properties.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PropertyStore for MemoryPropertyStore {
    fn get(&self, key: &str) -> StorageResult<Option<PropertyValue>> {
        Ok(self.properties.read().unwrap().get(key).cloned())
    }

    fn commit(&self, batch: PropertyBatch) -> StorageResult<()> {
        let mut properties = self.properties.write().unwrap();
        for (key, value) in batch.into_writes() {
            match value {
                Some(value) => properties.insert(key, value),
                None => properties.remove(&key),
            };
        }
        Ok(())
    }
}

/// RocksDB-backed property store; values are bincode-encoded
pub struct RocksPropertyStore {
    /// RocksDB instance
    db: Arc<DB>,
    /// Column family holding the properties
    column_family: String,
    /// Storage path
    path: String,
}

impl RocksPropertyStore {
    /// Open or create a store at `path`, using `column_family` for the properties
    pub fn open(path: impl AsRef<Path>, column_family: &str) -> StorageResult<Self> {
        let path_str = path.as_ref().to_string_lossy().into_owned();

        info!("Opening property storage at: {}", path_str);

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts.set_wal_recovery_mode(rocksdb::DBRecoveryMode::PointInTime);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new("default", Options::default()),
            ColumnFamilyDescriptor::new(column_family, Self::property_cf_options()),
        ];

        let db = DB::open_cf_descriptors(&opts, &path_str, cf_descriptors)?;

        info!("Property storage opened successfully");

        Ok(Self {
            db: Arc::new(db),
            column_family: column_family.to_string(),
            path: path_str,
        })
    }

    /// Column family options for properties
    fn property_cf_options() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
        opts
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Flush memtables to disk
    pub fn flush(&self) -> StorageResult<()> {
        self.db.flush()?;
        debug!("Flushed property storage");
        Ok(())
    }
}

impl PropertyStore for RocksPropertyStore {
    fn get(&self, key: &str) -> StorageResult<Option<PropertyValue>> {
        let cf = self.db.cf_handle(&self.column_family)
            .ok_or_else(|| StorageError::ColumnFamily(self.column_family.clone()))?;

        match self.db.get_cf(&cf, key.as_bytes())? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    fn commit(&self, batch: PropertyBatch) -> StorageResult<()> {
        let cf = self.db.cf_handle(&self.column_family)
            .ok_or_else(|| StorageError::ColumnFamily(self.column_family.clone()))?;

        let mut write_batch = WriteBatch::default();
        let count = batch.len();
        for (key, value) in batch.into_writes() {
            match value {
                Some(value) => write_batch.put_cf(&cf, key.as_bytes(), bincode::serialize(&value)?),
                None => write_batch.delete_cf(&cf, key.as_bytes()),
            }
        }
        self.db.write(write_batch)?;

        debug!("Committed {} property writes", count);
        Ok(())
    }
}

impl std::fmt::Debug for RocksPropertyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksPropertyStore")
            .field("path", &self.path)
            .field("column_family", &self.column_family)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn array(items: &[&str]) -> PropertyValue {
        PropertyValue::StringArray(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_memory_batch() {
        let store = MemoryPropertyStore::new();
        let mut batch = PropertyBatch::new();
        batch.set("a", array(&["x"])).set("b", PropertyValue::Integer(3));
        store.commit(batch).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a").unwrap(), Some(array(&["x"])));
        assert_eq!(store.get("missing").unwrap(), None);

        let mut batch = PropertyBatch::new();
        batch.remove("a");
        store.commit(batch).unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_storage_open() {
        let temp_dir = TempDir::new().unwrap();
        let store = RocksPropertyStore::open(temp_dir.path(), "graph_properties").unwrap();
        assert_eq!(store.get("CONSTRAINT").unwrap(), None);
    }

    #[test]
    fn test_rocks_put_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = RocksPropertyStore::open(temp_dir.path(), "graph_properties").unwrap();

        let mut batch = PropertyBatch::new();
        batch.set("CONSTRAINT", array(&["Person", "Company"]));
        store.commit(batch).unwrap();

        assert_eq!(store.get("CONSTRAINT").unwrap(), Some(array(&["Person", "Company"])));
    }

    #[test]
    fn test_rocks_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = RocksPropertyStore::open(temp_dir.path(), "graph_properties").unwrap();
            let mut batch = PropertyBatch::new();
            batch.set("k", PropertyValue::String("v".to_string()));
            store.commit(batch).unwrap();
            store.flush().unwrap();
        }

        let store = RocksPropertyStore::open(temp_dir.path(), "graph_properties").unwrap();
        assert_eq!(store.get("k").unwrap(), Some(PropertyValue::String("v".to_string())));

        let mut batch = PropertyBatch::new();
        batch.remove("k");
        store.commit(batch).unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
