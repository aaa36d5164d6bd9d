//! Fake transport for driving download tasks deterministically.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use formdesk_download::{DownloadError, DownloadResult, FetchedForm, FormTransport};
use tokio::sync::{Mutex as AsyncMutex, oneshot};

/// Transport whose fetch blocks until the paired [`TransportGate`] is resolved.
///
/// The gate is single use; a second fetch fails immediately.
pub struct GatedTransport {
    gate: AsyncMutex<Option<oneshot::Receiver<bool>>>,
    output: Option<(PathBuf, String)>,
    fetches: AtomicUsize,
}

/// Controls the outcome of a [`GatedTransport`] fetch.
pub struct TransportGate {
    sender: oneshot::Sender<bool>,
}

impl TransportGate {
    /// Let the fetch finish successfully.
    pub fn succeed(self) {
        let _ = self.sender.send(true);
    }

    /// Let the fetch finish with a failure.
    pub fn fail(self) {
        let _ = self.sender.send(false);
    }
}

impl GatedTransport {
    /// Transport that writes nothing on success.
    #[must_use]
    pub fn new() -> (Arc<Self>, TransportGate) {
        Self::build(None)
    }

    /// Transport that writes `name` into `dir` when the gate succeeds.
    #[must_use]
    pub fn writing_into(dir: impl Into<PathBuf>, name: impl Into<String>) -> (Arc<Self>, TransportGate) {
        Self::build(Some((dir.into(), name.into())))
    }

    /// Number of fetches started so far.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn build(output: Option<(PathBuf, String)>) -> (Arc<Self>, TransportGate) {
        let (sender, receiver) = oneshot::channel();
        let transport = Arc::new(Self {
            gate: AsyncMutex::new(Some(receiver)),
            output,
            fetches: AtomicUsize::new(0),
        });
        (transport, TransportGate { sender })
    }
}

#[async_trait]
impl FormTransport for GatedTransport {
    async fn fetch(&self) -> DownloadResult<FetchedForm> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().await.take();
        let success = match gate {
            Some(receiver) => receiver.await.unwrap_or(false),
            None => false,
        };
        if !success {
            return Err(DownloadError::Transport {
                operation: "gated_fetch",
                source: "gate resolved with failure".into(),
            });
        }

        match &self.output {
            Some((dir, name)) => {
                let path = dir.join(name);
                tokio::fs::write(&path, crate::fixtures::FIXTURE_FORM_BODY)
                    .await
                    .map_err(|source| DownloadError::Io {
                        operation: "gated_write",
                        path,
                        source,
                    })?;
                Ok(FetchedForm {
                    name: name.clone(),
                    bytes: crate::fixtures::FIXTURE_FORM_BODY.len() as u64,
                })
            }
            None => Ok(FetchedForm {
                name: "gated.xml".to_string(),
                bytes: 0,
            }),
        }
    }
}
