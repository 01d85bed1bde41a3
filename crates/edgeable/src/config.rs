//! Construction-time configuration for a [`GraphStore`](crate::GraphStore).
//!
//! A config can be built in code or read from JSON:
//!
//! ```
//! use edgeable::StoreConfig;
//!
//! let config = StoreConfig::from_json_str(r#"{
//!     "snapshot_path": "routes.db",
//!     "properties": { "name": { "String": "routes" } }
//! }"#).unwrap();
//! assert!(config.load_existing);
//! ```

use crate::error::{GraphError, Result};
use crate::graph::{PropertyMap, PropertyValue};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default snapshot file name.
pub const DEFAULT_SNAPSHOT_PATH: &str = "graph.db";

/// Default gzip level for snapshots.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Where `save` and `load` read and write the snapshot.
    pub snapshot_path: PathBuf,
    /// Initial store-level properties.
    pub properties: PropertyMap,
    /// Hydrate from the snapshot at open time if one exists.
    pub load_existing: bool,
    /// gzip level, 0 (none) to 9 (best).
    pub compression_level: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            properties: PropertyMap::new(),
            load_existing: true,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl StoreConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the snapshot path.
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = path.into();
        self
    }

    /// Builder: replace the initial store properties.
    pub fn with_properties(mut self, properties: PropertyMap) -> Self {
        self.properties = properties;
        self
    }

    /// Builder: add one initial store property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Builder: hydrate from an existing snapshot at open time.
    pub fn with_load_existing(mut self, load_existing: bool) -> Self {
        self.load_existing = load_existing;
        self
    }

    /// Builder: set the gzip level.
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Serialization`] for malformed JSON and
    /// [`GraphError::InvalidArgument`] if the parsed values are invalid.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| GraphError::serialization("Failed to parse store config", Some(e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            GraphError::storage(format!("Failed to read config {}", path.display()), Some(e))
        })?;
        Self::from_json_str(&json)
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidArgument`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        Self::validate_snapshot_path(&self.snapshot_path)?;
        self.properties.validate()?;
        if self.compression_level > 9 {
            return Err(GraphError::invalid_argument(format!(
                "compression_level must be between 0 and 9, got {}",
                self.compression_level
            )));
        }
        Ok(())
    }

    /// A snapshot path must name a file.
    pub(crate) fn validate_snapshot_path(path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() || path.file_name().is_none() {
            return Err(GraphError::invalid_argument(format!(
                "snapshot path {} does not name a file",
                path.display()
            )));
        }
        Ok(())
    }
}
