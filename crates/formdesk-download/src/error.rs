//! Error types for download tasks and transports.

use std::error::Error;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::task::TaskStatus;

/// Primary error type for download operations.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// `start` was called on a task that already left the idle state.
    #[error("download task already started")]
    AlreadyStarted {
        /// Task identifier.
        task_id: Uuid,
        /// Status observed when the second start was attempted.
        status: TaskStatus,
    },
    /// `start` was called outside a Tokio runtime.
    #[error("no async runtime available to run the download")]
    RuntimeUnavailable {
        /// Task identifier.
        task_id: Uuid,
    },
    /// The HTTP request could not be completed.
    #[error("form request failed")]
    Http {
        /// URL used for the request.
        url: String,
        /// Source HTTP client error.
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("form request returned an error status")]
    HttpStatus {
        /// URL used for the request.
        url: String,
        /// HTTP status code returned by the server.
        status: u16,
    },
    /// Writing the downloaded form failed.
    #[error("form write failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// Transport-specific failure not covered above.
    #[error("form transport failed")]
    Transport {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

/// Convenience alias for download results.
pub type DownloadResult<T> = Result<T, DownloadError>;
