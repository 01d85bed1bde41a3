//! Single-file snapshot backend.
//!
//! Every write goes to a uniquely named temporary file beside the target,
//! which is synced and then renamed over it. A concurrent reader of the path
//! sees the old snapshot or the new one, never a partial write.

use super::SnapshotBackend;
use crate::error::{GraphError, Result};
use log::{debug, warn};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Snapshot stored in one file on disk.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Backend for the snapshot at `path`. Nothing is touched until the first write.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writers are not serialized against each other, so each one needs its
    /// own temporary file.
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "snapshot".to_string());
        self.path
            .with_file_name(format!(".{name}.{}.tmp", uuid::Uuid::new_v4().simple()))
    }

    fn write_temp(&self, tmp: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(tmp)?;
        file.write_all(bytes)?;
        file.sync_all()
    }
}

impl SnapshotBackend for FileBackend {
    fn write(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                GraphError::storage(
                    format!("Failed to create directory {}", parent.display()),
                    Some(e),
                )
            })?;
        }

        let tmp = self.temp_path();
        debug!("Writing snapshot to {}", tmp.display());
        let outcome = self
            .write_temp(&tmp, bytes)
            .and_then(|_| fs::rename(&tmp, &self.path));
        if let Err(e) = outcome {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!("Failed to remove {}: {}", tmp.display(), cleanup);
                }
            }
            return Err(GraphError::storage(
                format!("Failed to write snapshot {}", self.path.display()),
                Some(e),
            ));
        }
        Ok(())
    }

    fn read(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GraphError::storage(
                format!("Failed to read snapshot {}", self.path.display()),
                Some(e),
            )),
        }
    }

    fn exists(&self) -> Result<bool> {
        self.path.try_exists().map_err(|e| {
            GraphError::storage(
                format!("Failed to check snapshot {}", self.path.display()),
                Some(e),
            )
        })
    }

    fn location(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
