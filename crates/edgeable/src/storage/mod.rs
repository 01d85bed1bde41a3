//! Snapshot persistence.
//!
//! This module defines the [`SnapshotBackend`] trait and provides implementations:
//! - [`FileBackend`]: a single snapshot file replaced atomically on every save
//! - [`MemoryBackend`]: in-memory snapshots for testing
//!
//! ## Design Philosophy
//!
//! - **Whole-graph snapshots**: every save writes the complete state; there is no incremental format
//! - **Explicit Operations**: nothing is saved unless the caller asks
//! - **All or nothing**: a snapshot is decoded and validated in full before it replaces anything

mod codec;
mod file;
mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use crate::error::Result;
use crate::graph::GraphState;
use std::path::PathBuf;

/// Where encoded snapshots are kept.
///
/// Backends move opaque bytes; encoding lives in the persistence manager.
pub trait SnapshotBackend: Send + Sync {
    /// Replace the stored snapshot with `bytes`.
    ///
    /// Readers of the backend must observe either the old or the new snapshot,
    /// never a mix.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Storage`](crate::GraphError::Storage) if the write
    /// fails; the previous snapshot must then still be readable.
    fn write(&self, bytes: &[u8]) -> Result<()>;

    /// Read the stored snapshot.
    ///
    /// Returns `Ok(None)` if no snapshot has been written yet.
    fn read(&self) -> Result<Option<Vec<u8>>>;

    /// Check whether a snapshot exists.
    fn exists(&self) -> Result<bool>;

    /// Filesystem location of the snapshot, if any.
    fn location(&self) -> Option<PathBuf> {
        None
    }

    /// Human readable description used in log messages.
    fn describe(&self) -> String;
}

/// Encodes graph state and hands it to a backend.
pub(crate) struct PersistenceManager {
    backend: Box<dyn SnapshotBackend>,
    compression_level: u32,
}

impl PersistenceManager {
    pub fn new(backend: Box<dyn SnapshotBackend>, compression_level: u32) -> Self {
        Self {
            backend,
            compression_level,
        }
    }

    pub fn encode(&self, state: &GraphState) -> Result<Vec<u8>> {
        codec::encode(state, self.compression_level)
    }

    pub fn persist(&self, bytes: &[u8]) -> Result<()> {
        self.backend.write(bytes)
    }

    /// Read and fully decode the stored snapshot, if there is one.
    pub fn restore(&self) -> Result<Option<GraphState>> {
        match self.backend.read()? {
            Some(bytes) => codec::decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    pub fn location(&self) -> Option<PathBuf> {
        self.backend.location()
    }

    pub fn describe(&self) -> String {
        self.backend.describe()
    }
}
