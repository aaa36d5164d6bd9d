//! Forms screen controller.
//!
//! # Design
//! - One foreground owner drives the controller through `&mut self`.
//! - Download results arrive on the task's worker and are forwarded over a
//!   channel; the owner consumes them with [`SurfaceController::next_completion`].
//! - Every mutation of the directory is followed by a full re-list; the
//!   snapshot is never patched in place.

use std::sync::Arc;

use formdesk_download::{DownloadListener, DownloadTask, FormTransport, TaskStatus};
use formdesk_events::{Event, EventBus};
use formdesk_store::{FileListSnapshot, FileStore};
use formdesk_telemetry::Metrics;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{SurfaceError, SurfaceResult};
use crate::handoff::HandoffRegistry;
use crate::prompt::{Confirmation, DeleteOutcome, DeletePrompt};
use crate::state::{PendingDeletion, SelectionState, SurfacePhase};

/// Collaborators a surface is built from.
#[derive(Clone)]
pub struct SurfaceDeps {
    /// Forms directory.
    pub store: FileStore,
    /// Handoff slot shared by every surface of this screen.
    pub registry: HandoffRegistry,
    /// Notification sink for the presentation glue.
    pub events: EventBus,
    /// Shared metrics registry.
    pub metrics: Metrics,
    /// Download source; downloads are refused without one.
    pub transport: Option<Arc<dyn FormTransport>>,
}

#[derive(Debug, Clone, Copy)]
struct Completion {
    task_id: Uuid,
    success: bool,
}

/// Listener bound to one task on behalf of one surface.
struct SurfaceListener {
    task_id: Uuid,
    sender: mpsc::UnboundedSender<Completion>,
}

impl DownloadListener for SurfaceListener {
    fn on_complete(&self, success: bool) {
        let completion = Completion {
            task_id: self.task_id,
            success,
        };
        if self.sender.send(completion).is_err() {
            debug!(task_id = %self.task_id, success, "surface gone; download result dropped");
        }
    }
}

/// Drives listing, deletion and downloads for one forms screen instance.
pub struct SurfaceController {
    store: FileStore,
    registry: HandoffRegistry,
    events: EventBus,
    metrics: Metrics,
    transport: Option<Arc<dyn FormTransport>>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    task: Option<Arc<DownloadTask>>,
    snapshot: FileListSnapshot,
    selection: Option<SelectionState>,
    pending_deletion: Option<PendingDeletion>,
    progress_visible: bool,
    phase: SurfacePhase,
}

impl SurfaceController {
    /// Build an inactive surface. Call [`Self::activate`] before use.
    #[must_use]
    pub fn new(deps: SurfaceDeps) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            store: deps.store,
            registry: deps.registry,
            events: deps.events,
            metrics: deps.metrics,
            transport: deps.transport,
            completion_tx,
            completion_rx,
            task: None,
            snapshot: FileListSnapshot::default(),
            selection: None,
            pending_deletion: None,
            progress_visible: false,
            phase: SurfacePhase::Created,
        }
    }

    /// Adopt a parked download, rebind to it, then refresh the listing.
    ///
    /// A parked download that already finished is dropped without showing
    /// progress; its result is not replayed.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Store`] if the refresh fails.
    pub fn activate(&mut self) -> SurfaceResult<&FileListSnapshot> {
        if self.task.is_none() {
            self.task = self.registry.retrieve();
        }
        if let Some(task) = self.task.clone() {
            match task.set_listener(Some(self.listener_for(&task))) {
                TaskStatus::Running => {
                    info!(task_id = %task.id(), "rebound to running download");
                    self.show_progress();
                }
                TaskStatus::Completed { success } => {
                    let _ = task.set_listener(None);
                    info!(
                        task_id = %task.id(),
                        success,
                        "parked download finished while detached; result not replayed"
                    );
                    self.task = None;
                    self.progress_visible = false;
                }
                TaskStatus::Idle => {
                    let _ = task.set_listener(None);
                    warn!(task_id = %task.id(), "parked download was never started; discarding");
                    self.task = None;
                }
            }
        }
        self.phase = SurfacePhase::Active;
        self.request_refresh()
    }

    /// Detach from the held download and park it for the next surface.
    ///
    /// The download keeps running. A result already delivered to this surface
    /// but not yet consumed is handled here instead of being parked. Any
    /// pending deletion is discarded.
    pub fn deactivate(&mut self) {
        if let Some(task) = self.task.clone() {
            match task.set_listener(None) {
                TaskStatus::Completed { .. } => match self.take_queued(task.id()) {
                    Some(success) => self.finish_download(success),
                    None => {
                        debug!(task_id = %task.id(), "held download already finished; nothing to park");
                        self.task = None;
                    }
                },
                TaskStatus::Running | TaskStatus::Idle => {
                    self.task = None;
                    let _ = self.registry.retain(task);
                    self.metrics.inc_task_handoff();
                }
            }
        }
        self.progress_visible = false;
        self.pending_deletion = None;
        self.phase = SurfacePhase::Inactive;
        debug!("surface deactivated");
    }

    /// Wait for the next result delivered to this surface.
    ///
    /// Results from tasks this surface no longer holds are skipped. Pends
    /// while no download is bound. Cancel safe.
    pub async fn next_completion(&mut self) -> Option<bool> {
        loop {
            let completion = self.completion_rx.recv().await?;
            let current = self.task.as_ref().map(|task| task.id());
            if current == Some(completion.task_id) {
                return Some(completion.success);
            }
            debug!(task_id = %completion.task_id, "ignoring result from released download");
        }
    }

    /// Wait for the held download to finish and handle its result.
    ///
    /// Returns `None` immediately when no download is held.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Store`] if the follow-up refresh fails.
    pub async fn wait_for_download(&mut self) -> SurfaceResult<Option<bool>> {
        if self.task.is_none() {
            return Ok(None);
        }
        let Some(success) = self.next_completion().await else {
            return Ok(None);
        };
        self.handle_download_finished(success)?;
        Ok(Some(success))
    }

    /// Handle the single result of the bound download.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Store`] if the follow-up refresh fails.
    pub fn handle_download_finished(&mut self, success: bool) -> SurfaceResult<&FileListSnapshot> {
        self.finish_download(success);
        self.request_refresh()
    }

    /// Re-list the directory and publish the new listing.
    ///
    /// Clears the selection whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Store`] when the directory cannot be read; a
    /// `ListFailed` event is published first.
    pub fn request_refresh(&mut self) -> SurfaceResult<&FileListSnapshot> {
        self.selection = None;
        match self.store.list() {
            Ok(snapshot) => {
                self.metrics.inc_refresh(true);
                debug!(count = snapshot.len(), "form list refreshed");
                let _ = self.events.publish(Event::ListUpdated {
                    names: snapshot.names().to_vec(),
                });
                self.snapshot = snapshot;
                Ok(&self.snapshot)
            }
            Err(source) => {
                self.metrics.inc_refresh(false);
                warn!(
                    directory = %source.path().display(),
                    error = %source,
                    "form list refresh failed"
                );
                let _ = self.events.publish(Event::ListFailed {
                    message: format!("{source}: {}", source.path().display()),
                });
                Err(SurfaceError::Store { source })
            }
        }
    }

    /// Select the row at `index` of the current listing.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::InvalidSelection`] when `index` is out of range.
    pub fn select(&mut self, index: usize) -> SurfaceResult<&SelectionState> {
        let name = self
            .snapshot
            .get(index)
            .ok_or(SurfaceError::InvalidSelection {
                index,
                len: self.snapshot.len(),
            })?
            .to_string();
        Ok(self.selection.insert(SelectionState { index, name }))
    }

    /// Ask for confirmation, then delete `name` and refresh.
    ///
    /// A failed deletion is reported as a `DeleteResult` event, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Store`] if the follow-up refresh fails.
    pub async fn request_delete(
        &mut self,
        name: &str,
        prompt: &mut dyn DeletePrompt,
    ) -> SurfaceResult<DeleteOutcome> {
        self.pending_deletion = Some(PendingDeletion {
            name: name.to_string(),
        });
        let decision = prompt.confirm(name).await;
        self.pending_deletion = None;

        if decision == Confirmation::Cancel {
            debug!(name, "form deletion cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }

        let success = self.store.delete(name);
        self.metrics.inc_deletion(success);
        let _ = self.events.publish(Event::DeleteResult {
            name: name.to_string(),
            success,
        });
        self.request_refresh()?;
        Ok(if success {
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::Failed
        })
    }

    /// Delete the selected form, or ask for a selection first.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Store`] if the follow-up refresh fails.
    pub async fn delete_selected(
        &mut self,
        prompt: &mut dyn DeletePrompt,
    ) -> SurfaceResult<DeleteOutcome> {
        let Some(selection) = self.selection.clone() else {
            let _ = self.events.publish(Event::SelectionRequired);
            return Ok(DeleteOutcome::NothingSelected);
        };
        self.request_delete(&selection.name, prompt).await
    }

    /// Start a new download bound to this surface.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::DownloadInFlight`] while a held download is
    /// unfinished, [`SurfaceError::DownloadUnavailable`] without a transport,
    /// and [`SurfaceError::Download`] if the task refuses to start.
    pub fn request_download(&mut self) -> SurfaceResult<()> {
        if let Some(task) = self.task.as_ref().filter(|task| !task.is_completed()) {
            return Err(SurfaceError::DownloadInFlight { task_id: task.id() });
        }
        let transport = self
            .transport
            .clone()
            .ok_or(SurfaceError::DownloadUnavailable)?;

        let task = DownloadTask::new(transport);
        let _ = task.set_listener(Some(self.listener_for(&task)));
        if let Err(source) = task.start() {
            error!(task_id = %task.id(), error = %source, "form download refused to start");
            return Err(SurfaceError::Download { source });
        }
        self.metrics.inc_download_started();
        self.task = Some(task);
        self.show_progress();
        Ok(())
    }

    /// Stop watching the held download without cancelling it.
    ///
    /// Returns whether a download was held.
    pub fn abandon_download(&mut self) -> bool {
        let Some(task) = self.task.take() else {
            return false;
        };
        let _ = task.set_listener(None);
        info!(task_id = %task.id(), "download abandoned; work continues unobserved");
        self.hide_progress();
        true
    }

    /// Listing as of the last successful refresh.
    #[must_use]
    pub const fn snapshot(&self) -> &FileListSnapshot {
        &self.snapshot
    }

    /// Current selection.
    #[must_use]
    pub const fn selection(&self) -> Option<&SelectionState> {
        self.selection.as_ref()
    }

    /// Form awaiting confirmation.
    #[must_use]
    pub const fn pending_deletion(&self) -> Option<&PendingDeletion> {
        self.pending_deletion.as_ref()
    }

    /// Whether the progress indicator is shown.
    #[must_use]
    pub const fn progress_visible(&self) -> bool {
        self.progress_visible
    }

    /// Download currently bound to this surface.
    #[must_use]
    pub const fn task(&self) -> Option<&Arc<DownloadTask>> {
        self.task.as_ref()
    }

    /// Lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SurfacePhase {
        self.phase
    }

    fn finish_download(&mut self, success: bool) {
        let task_id = self.task.take().map(|task| task.id());
        info!(task_id = ?task_id, success, "form download finished");
        self.hide_progress();
        self.metrics.inc_download_finished(success);
        let _ = self.events.publish(Event::DownloadFinished { success });
    }

    /// Pull a result for `task_id` that was delivered but not yet consumed.
    fn take_queued(&mut self, task_id: Uuid) -> Option<bool> {
        let mut found = None;
        while let Ok(completion) = self.completion_rx.try_recv() {
            if completion.task_id == task_id {
                found = Some(completion.success);
            } else {
                debug!(task_id = %completion.task_id, "ignoring result from released download");
            }
        }
        found
    }

    fn listener_for(&self, task: &DownloadTask) -> Arc<dyn DownloadListener> {
        Arc::new(SurfaceListener {
            task_id: task.id(),
            sender: self.completion_tx.clone(),
        })
    }

    fn show_progress(&mut self) {
        self.progress_visible = true;
        let _ = self
            .events
            .publish(Event::DownloadProgressChanged { running: true });
    }

    fn hide_progress(&mut self) {
        if self.progress_visible {
            self.progress_visible = false;
            let _ = self
                .events
                .publish(Event::DownloadProgressChanged { running: false });
        }
    }
}
