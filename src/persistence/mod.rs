//! Persistence of constraint definitions
//!
//! The constraint set is stored as a string array under one graph-level
//! property key. [`storage`] provides the property stores (in memory and
//! RocksDB), [`persister`] the load / store / define operations.

pub mod persister;
pub mod storage;

pub use persister::{ConstraintPersister, CONSTRAINT_KEY};
pub use storage::{
    MemoryPropertyStore, PropertyBatch, PropertyStore, RocksPropertyStore, StorageError,
    StorageResult,
};

use crate::constraint::{FormatError, ParseError};

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Stored constraints are malformed: {0}")]
    Format(#[from] FormatError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;
