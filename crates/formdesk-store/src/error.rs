//! # Design
//!
//! - Provide structured, constant-message errors for directory access.
//! - Capture the operation and path so failures are reproducible in tests.
//! - Deletion never produces an error; it reports a boolean instead.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors produced while reading the forms directory.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO failures while interacting with the directory.
    #[error("forms directory io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Directory traversal failed part way through a listing.
    #[error("forms directory traversal failure")]
    Walk {
        /// Directory being listed.
        path: PathBuf,
        /// Underlying walkdir error.
        source: walkdir::Error,
    },
    /// The configured forms path exists but is not a directory.
    #[error("forms path is not a directory")]
    NotDirectory {
        /// Offending path.
        path: PathBuf,
    },
}

impl StoreError {
    /// Path associated with the failure.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Walk { path, .. } | Self::NotDirectory { path } => path,
        }
    }
}
