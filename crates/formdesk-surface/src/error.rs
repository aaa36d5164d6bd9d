//! Error types surfaced to the presentation glue.

use formdesk_download::DownloadError;
use formdesk_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for surface operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Failures reported by [`crate::SurfaceController`].
///
/// Deletion failures are not errors; they arrive as `DeleteResult` events.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The forms directory could not be listed.
    #[error("failed to list forms")]
    Store {
        /// Underlying store failure.
        #[from]
        source: StoreError,
    },
    /// A download could not be started.
    #[error("failed to start form download")]
    Download {
        /// Underlying download failure.
        #[from]
        source: DownloadError,
    },
    /// A download bound to this surface has not completed yet.
    #[error("a form download is already in progress")]
    DownloadInFlight {
        /// Task currently held by the surface.
        task_id: Uuid,
    },
    /// No download source is configured.
    #[error("form downloads are not configured")]
    DownloadUnavailable,
    /// The requested row is outside the current listing.
    #[error("selection is outside the form list")]
    InvalidSelection {
        /// Requested row.
        index: usize,
        /// Number of rows in the listing.
        len: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::path::PathBuf;

    #[test]
    fn store_failures_keep_their_source() {
        let err = SurfaceError::from(StoreError::NotDirectory {
            path: PathBuf::from("forms"),
        });
        assert_eq!(err.to_string(), "failed to list forms");
        assert!(err.source().is_some());
    }

    #[test]
    fn selection_error_has_constant_message() {
        let err = SurfaceError::InvalidSelection { index: 4, len: 2 };
        assert_eq!(err.to_string(), "selection is outside the form list");
        assert!(err.source().is_none());
    }
}
