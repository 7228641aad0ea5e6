//! Collection error types.
//!
//! Every variant here is fatal for the segment that raised it; other
//! segments of the same collection are unaffected.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CollectionError>;

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("Malformed resource {}: {reason}", path.display())]
    MalformedResource { path: PathBuf, reason: String },

    #[error("Collection root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CollectionError {
    pub fn malformed(path: &Path, reason: impl std::fmt::Display) -> Self {
        CollectionError::MalformedResource {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}
