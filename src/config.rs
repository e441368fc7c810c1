//! Engine configuration, loadable from YAML

use crate::persistence::{ConstraintPersister, PropertyStore, RocksPropertyStore, StorageResult, CONSTRAINT_KEY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Where and under which key constraints are stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintConfig {
    /// Graph property key holding the serialized constraints
    pub storage_key: String,
    /// RocksDB directory
    pub data_path: PathBuf,
    /// Column family for graph properties
    pub column_family: String,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            storage_key: CONSTRAINT_KEY.to_string(),
            data_path: PathBuf::from("./constraint_data"),
            column_family: "graph_properties".to_string(),
        }
    }
}

impl ConstraintConfig {
    /// Parse YAML; missing fields take their defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Open the RocksDB property store described by this configuration
    pub fn open_store(&self) -> StorageResult<RocksPropertyStore> {
        RocksPropertyStore::open(&self.data_path, &self.column_family)
    }

    /// A persister over `store` using the configured key
    pub fn persister<S: PropertyStore>(&self, store: S) -> ConstraintPersister<S> {
        ConstraintPersister::with_key(store, self.storage_key.clone())
    }
}
