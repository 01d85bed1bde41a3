//! In-memory snapshot backend for testing.
//!
//! **Note**: This backend is for testing only. Do not use in production.
//! All data is lost when the last clone of the backend is dropped.

use super::SnapshotBackend;
use crate::error::Result;
use parking_lot::RwLock;
use std::sync::Arc;

/// In-memory snapshot slot.
///
/// Clones share the same slot, so a test can keep one clone to inspect what a
/// store saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<Option<Vec<u8>>>>,
}

impl MemoryBackend {
    /// Create a new empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of the stored snapshot in bytes, 0 when empty.
    ///
    /// Useful for testing and assertions.
    pub fn len(&self) -> usize {
        self.data.read().as_ref().map_or(0, Vec::len)
    }

    /// Check if no snapshot has been stored.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_none()
    }

    /// Drop the stored snapshot.
    pub fn clear(&self) {
        *self.data.write() = None;
    }

    /// Overwrite the stored bytes directly.
    ///
    /// Lets tests plant corrupt snapshots.
    pub fn set_raw(&self, bytes: Vec<u8>) {
        *self.data.write() = Some(bytes);
    }
}

impl SnapshotBackend for MemoryBackend {
    fn write(&self, bytes: &[u8]) -> Result<()> {
        *self.data.write() = Some(bytes.to_vec());
        Ok(())
    }

    fn read(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.data.read().clone())
    }

    fn exists(&self) -> Result<bool> {
        Ok(self.data.read().is_some())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}
