//! Restricted-root file loading
//!
//! Every file the chart configuration points at (values files, additional
//! values files) is read through a [`Loader`], which decides whether the
//! path may be read at all.
//!
//! # Security
//!
//! With [`LoadRestriction::RootOnly`]:
//! - Relative paths are resolved against the loader root
//! - Symlinks and `..` components are resolved before the check
//! - Anything that resolves outside the root is rejected

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Read access to files below a root directory
///
/// Implementations must be safe to share between concurrent inflations.
pub trait Loader: Send + Sync {
    /// Directory relative paths are resolved against
    fn root(&self) -> &Path;

    /// Read the full contents of a file
    fn load(&self, path: &Path) -> Result<Vec<u8>>;
}

/// Which paths a [`FileLoader`] may read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadRestriction {
    /// Only files in or below the root
    #[default]
    RootOnly,
    /// Any readable file
    None,
}

impl LoadRestriction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RootOnly => "root-only",
            Self::None => "none",
        }
    }
}

impl fmt::Display for LoadRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadRestriction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "root-only" | "rootOnly" => Ok(Self::RootOnly),
            "none" => Ok(Self::None),
            other => Err(format!(
                "unknown load restriction '{}', expected 'root-only' or 'none'",
                other
            )),
        }
    }
}

/// Filesystem loader anchored at a root directory
#[derive(Debug, Clone)]
pub struct FileLoader {
    /// Canonicalized root
    root: PathBuf,
    restriction: LoadRestriction,
}

impl FileLoader {
    /// Create a loader rooted at `root`
    ///
    /// # Errors
    ///
    /// Returns an error if the root doesn't exist or cannot be canonicalized.
    pub fn new(root: impl AsRef<Path>, restriction: LoadRestriction) -> Result<Self> {
        let root = root.as_ref();

        if !root.is_dir() {
            return Err(CoreError::FileAccess {
                path: root.to_path_buf(),
                message: "loader root is not a directory".to_string(),
            });
        }

        let root = root.canonicalize().map_err(|e| CoreError::FileAccess {
            path: root.to_path_buf(),
            message: format!("failed to canonicalize loader root: {}", e),
        })?;

        Ok(Self { root, restriction })
    }

    /// Resolve a path and verify it may be read
    fn resolve_path(&self, path: &Path) -> Result<PathBuf> {
        let full_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        if !full_path.exists() {
            return Err(CoreError::FileAccess {
                path: path.to_path_buf(),
                message: "file not found".to_string(),
            });
        }

        let canonical = full_path.canonicalize().map_err(|e| CoreError::FileAccess {
            path: path.to_path_buf(),
            message: format!("failed to resolve path: {}", e),
        })?;

        if self.restriction == LoadRestriction::RootOnly && !canonical.starts_with(&self.root) {
            return Err(CoreError::OutsideRoot {
                path: canonical,
                root: self.root.clone(),
            });
        }

        Ok(canonical)
    }
}

impl Loader for FileLoader {
    fn root(&self) -> &Path {
        &self.root
    }

    fn load(&self, path: &Path) -> Result<Vec<u8>> {
        let resolved = self.resolve_path(path)?;
        tracing::trace!(path = %resolved.display(), "loading file");
        Ok(std::fs::read(resolved)?)
    }
}

/// In-memory loader for tests
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    root: PathBuf,
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: HashMap::new(),
        }
    }

    /// Add a file; relative paths are stored below the root
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Self {
        let path = self.root.join(path.as_ref());
        self.files.insert(path, content.into());
        self
    }
}

impl Loader for MemoryLoader {
    fn root(&self) -> &Path {
        &self.root
    }

    fn load(&self, path: &Path) -> Result<Vec<u8>> {
        let path = self.root.join(path);
        self.files
            .get(&path)
            .cloned()
            .ok_or_else(|| CoreError::FileAccess {
                path,
                message: "file not found".to_string(),
            })
    }
}
