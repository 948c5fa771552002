//! Core error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot load '{}': {message}", .path.display())]
    FileAccess { path: PathBuf, message: String },

    #[error("Security: '{}' is not in or below '{}'", .path.display(), .root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Invalid resource in document {index}: {message}")]
    InvalidResource { index: usize, message: String },

    #[error("Invalid merge policy '{value}': must be one of {expected}")]
    InvalidMergePolicy { value: String, expected: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
