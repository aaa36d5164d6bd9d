//! Carries a running download from a surface being torn down to its successor.
//!
//! # Design
//! - One slot per logical screen; clones share the slot.
//! - `retrieve` empties the slot, so a task is adopted at most once.
//! - The registry stores references only and never replays completion.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use formdesk_download::DownloadTask;
use tracing::{debug, warn};

/// Single-slot holder for a download task across surface lifecycles.
#[derive(Debug, Clone, Default)]
pub struct HandoffRegistry {
    slot: Arc<Mutex<Option<Arc<DownloadTask>>>>,
}

impl HandoffRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Park `task` for the next surface, returning any task it displaced.
    pub fn retain(&self, task: Arc<DownloadTask>) -> Option<Arc<DownloadTask>> {
        let task_id = task.id();
        let displaced = self.lock_slot().replace(task);
        if let Some(previous) = &displaced {
            warn!(
                task_id = %task_id,
                displaced_id = %previous.id(),
                "handoff slot overwritten"
            );
        } else {
            debug!(task_id = %task_id, "download parked for handoff");
        }
        displaced
    }

    /// Take the parked task, leaving the slot empty.
    #[must_use]
    pub fn retrieve(&self) -> Option<Arc<DownloadTask>> {
        let task = self.lock_slot().take();
        if let Some(task) = &task {
            debug!(task_id = %task.id(), "download adopted from handoff");
        }
        task
    }

    /// Whether a task is currently parked.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.lock_slot().is_some()
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<Arc<DownloadTask>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use formdesk_download::{DownloadError, DownloadResult, FetchedForm, FormTransport};

    struct NeverTransport;

    #[async_trait]
    impl FormTransport for NeverTransport {
        async fn fetch(&self) -> DownloadResult<FetchedForm> {
            Err(DownloadError::Transport {
                operation: "never",
                source: "unused".into(),
            })
        }
    }

    fn task() -> Arc<DownloadTask> {
        DownloadTask::new(Arc::new(NeverTransport))
    }

    #[test]
    fn retrieve_returns_identical_task_once() {
        let registry = HandoffRegistry::new();
        let task = task();
        assert!(registry.retain(Arc::clone(&task)).is_none());
        assert!(registry.is_occupied());

        let adopted = registry.retrieve().expect("parked task");
        assert!(Arc::ptr_eq(&adopted, &task));
        assert!(registry.retrieve().is_none());
        assert!(!registry.is_occupied());
    }

    #[test]
    fn retain_overwrites_and_returns_previous() {
        let registry = HandoffRegistry::new();
        let first = task();
        let second = task();
        let _ = registry.retain(Arc::clone(&first));

        let displaced = registry.retain(Arc::clone(&second)).expect("displaced task");
        assert!(Arc::ptr_eq(&displaced, &first));
        let adopted = registry.retrieve().expect("parked task");
        assert!(Arc::ptr_eq(&adopted, &second));
    }

    #[test]
    fn clones_share_the_slot() {
        let registry = HandoffRegistry::new();
        let screen = registry.clone();
        let task = task();
        let _ = screen.retain(Arc::clone(&task));
        assert!(registry.retrieve().is_some_and(|adopted| Arc::ptr_eq(&adopted, &task)));
    }
}
