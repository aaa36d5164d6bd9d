//! Event payload types carried from the surface to the presentation glue.

use chrono::{DateTime, Utc};

/// Identifier assigned to each emitted event.
pub type EventId = u64;

/// Default buffer size for the in-memory replay ring.
pub const DEFAULT_REPLAY_CAPACITY: usize = 256;

/// Notifications the surface emits for the glue layer to render.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The visible form listing was rebuilt from the directory.
    ListUpdated {
        /// Form names in display order.
        names: Vec<String>,
    },
    /// The forms directory could not be read; distinct from an empty listing.
    ListFailed {
        /// Human-readable failure description.
        message: String,
    },
    /// A confirmed deletion finished.
    DeleteResult {
        /// Form that was targeted.
        name: String,
        /// Whether the file was removed.
        success: bool,
    },
    /// A delete was requested while nothing was selected.
    SelectionRequired,
    /// The download bound to the surface reported its single result.
    DownloadFinished {
        /// Whether the download succeeded.
        success: bool,
    },
    /// The progress indicator should be shown or hidden.
    DownloadProgressChanged {
        /// `true` while a download is in flight for this surface.
        running: bool,
    },
}

impl Event {
    /// Machine-friendly discriminator used in logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ListUpdated { .. } => "list_updated",
            Self::ListFailed { .. } => "list_failed",
            Self::DeleteResult { .. } => "delete_result",
            Self::SelectionRequired => "selection_required",
            Self::DownloadFinished { .. } => "download_finished",
            Self::DownloadProgressChanged { .. } => "download_progress_changed",
        }
    }
}

/// Metadata wrapper around events. Each envelope tracks the event id and emission timestamp.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct EventEnvelope {
    /// Monotonic identifier assigned to the wrapped event.
    pub id: EventId,
    /// Timestamp recording when the envelope was produced.
    pub timestamp: DateTime<Utc>,
    /// Wrapped event payload.
    pub event: Event,
}
