//! Download task state machine.
//!
//! A task runs exactly once: `Idle → Running → Completed`. Its single result is
//! handed to whichever listener occupies the slot at the moment the work
//! finishes. Replacing or clearing the listener never affects the work itself.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::error::{DownloadError, DownloadResult};
use crate::transport::FormTransport;

/// Receives the single terminal result of a download.
pub trait DownloadListener: Send + Sync {
    /// Called at most once per task, on the task's background worker.
    ///
    /// Runs while the task's listener slot is locked, so it must return
    /// promptly and must not call back into the task.
    fn on_complete(&self, success: bool);
}

/// Execution status of a [`DownloadTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created but not started.
    Idle,
    /// Work is in flight.
    Running,
    /// Work finished; the result has been delivered or dropped.
    Completed {
        /// Outcome of the download.
        success: bool,
    },
}

impl TaskStatus {
    /// Whether the task reached its terminal state.
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Stable label for logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed { success: true } => "succeeded",
            Self::Completed { success: false } => "failed",
        }
    }
}

struct TaskState {
    status: TaskStatus,
    listener: Option<Arc<dyn DownloadListener>>,
}

/// One download attempt, shared by reference between its owners.
///
/// Callers hold it as `Arc<DownloadTask>`; ownership of that reference moves
/// between surfaces and the handoff registry, the task itself is never cloned.
pub struct DownloadTask {
    id: Uuid,
    transport: Arc<dyn FormTransport>,
    state: Mutex<TaskState>,
    finished: watch::Sender<Option<bool>>,
}

impl DownloadTask {
    /// Create an idle task that will fetch through `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn FormTransport>) -> Arc<Self> {
        let (finished, _) = watch::channel(None);
        Arc::new(Self {
            id: Uuid::new_v4(),
            transport,
            state: Mutex::new(TaskState {
                status: TaskStatus::Idle,
                listener: None,
            }),
            finished,
        })
    }

    /// Identifier used in logs.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> TaskStatus {
        self.lock_state().status
    }

    /// Whether the task reached its terminal state.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status().is_completed()
    }

    /// Replace the completion listener and return the status seen at the swap.
    ///
    /// A listener attached after completion is not called; the result is only
    /// ever handed out once, at the moment the work finishes. When this returns
    /// `Completed`, the previous listener (if any) has already been called.
    pub fn set_listener(&self, listener: Option<Arc<dyn DownloadListener>>) -> TaskStatus {
        let mut state = self.lock_state();
        debug!(
            task_id = %self.id,
            attached = listener.is_some(),
            status = state.status.label(),
            "download listener replaced"
        );
        state.listener = listener;
        state.status
    }

    /// Start the download on the current Tokio runtime.
    ///
    /// The completion is never handled before this call returns.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::AlreadyStarted`] if the task is not idle and
    /// [`DownloadError::RuntimeUnavailable`] outside a Tokio runtime.
    pub fn start(self: &Arc<Self>) -> DownloadResult<()> {
        let runtime = Handle::try_current()
            .map_err(|_| DownloadError::RuntimeUnavailable { task_id: self.id })?;
        {
            let mut state = self.lock_state();
            if state.status != TaskStatus::Idle {
                return Err(DownloadError::AlreadyStarted {
                    task_id: self.id,
                    status: state.status,
                });
            }
            state.status = TaskStatus::Running;
        }

        let (release, released) = oneshot::channel::<()>();
        let task = Arc::clone(self);
        let span = info_span!("form_download", task_id = %self.id);
        runtime.spawn(
            async move {
                let success = match task.transport.fetch().await {
                    Ok(form) => {
                        info!(form = %form.name, bytes = form.bytes, "form downloaded");
                        true
                    }
                    Err(err) => {
                        warn!(error = ?err, "form download failed");
                        false
                    }
                };
                let _ = released.await;
                task.complete(success);
            }
            .instrument(span),
        );

        info!(task_id = %self.id, "form download started");
        let _ = release.send(());
        Ok(())
    }

    /// Wait until the completion has been handled and return the result.
    ///
    /// Never resolves for a task that is not started.
    pub async fn wait_completed(&self) -> bool {
        let mut finished = self.finished.subscribe();
        let outcome = finished.wait_for(Option::is_some).await.map(|seen| *seen);
        matches!(outcome, Ok(Some(true)))
    }

    fn complete(&self, success: bool) {
        {
            let mut state = self.lock_state();
            state.status = TaskStatus::Completed { success };
            if let Some(listener) = &state.listener {
                debug!(success, "delivering download result");
                listener.on_complete(success);
            } else {
                debug!(success, "no listener registered; download result dropped");
            }
        }
        self.finished.send_replace(Some(success));
    }

    fn lock_state(&self) -> MutexGuard<'_, TaskState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl fmt::Debug for DownloadTask {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DownloadTask")
            .field("id", &self.id)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
