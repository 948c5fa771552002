//! Per-invocation scratch directory
//!
//! Holds the effective values file and, unless the caller configured one,
//! the renderer's config/cache/data homes. The directory lives on the real
//! filesystem, outside any loader root, because the renderer subprocess
//! must be able to read and write it.

use std::io;
use std::path::PathBuf;
use tempfile::TempDir;

/// Prefix of scratch directory names
pub const SCRATCH_PREFIX: &str = "helmgen-helm-";

/// A temp directory created on first use and removed on release or drop
#[derive(Debug, Default)]
pub struct Scratch {
    dir: Option<TempDir>,
}

impl Scratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the directory, creating it if needed
    pub fn path(&mut self) -> io::Result<PathBuf> {
        let dir = match self.dir.take() {
            Some(dir) => dir,
            None => {
                let dir = tempfile::Builder::new().prefix(SCRATCH_PREFIX).tempdir()?;
                tracing::debug!(path = %dir.path().display(), "created scratch directory");
                dir
            }
        };
        Ok(self.dir.insert(dir).path().to_path_buf())
    }

    /// Whether the directory currently exists
    pub fn is_created(&self) -> bool {
        self.dir.is_some()
    }

    /// Remove the directory and everything in it
    pub fn release(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                tracing::warn!(path = %path.display(), "failed to remove scratch directory: {}", e);
            }
        }
    }
}
