//! Surface rebuild scenarios: a download started by one surface instance and
//! finished under another.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use formdesk_download::{FormTransport, TaskStatus};
use formdesk_events::{Event, EventBus, EventId};
use formdesk_store::FileStore;
use formdesk_surface::{HandoffRegistry, SurfaceController, SurfaceDeps, SurfacePhase};
use formdesk_telemetry::Metrics;
use formdesk_test_support::fixtures::forms_dir;
use formdesk_test_support::mocks::GatedTransport;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

struct Screen {
    deps: SurfaceDeps,
}

impl Screen {
    fn new(dir: &Path, transport: Arc<dyn FormTransport>) -> Result<Self> {
        Ok(Self {
            deps: SurfaceDeps {
                store: FileStore::new(dir),
                registry: HandoffRegistry::new(),
                events: EventBus::new(),
                metrics: Metrics::new()?,
                transport: Some(transport),
            },
        })
    }

    fn surface(&self) -> SurfaceController {
        SurfaceController::new(self.deps.clone())
    }

    fn events_since(&self, id: EventId) -> Vec<Event> {
        self.deps
            .events
            .backlog_since(id)
            .into_iter()
            .map(|envelope| envelope.event)
            .collect()
    }

    fn last_event_id(&self) -> EventId {
        self.deps.events.last_event_id().unwrap_or(0)
    }
}

fn finished(events: &[Event]) -> Vec<bool> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::DownloadFinished { success } => Some(*success),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn rebuilt_surface_receives_failure_exactly_once() -> Result<()> {
    let dir = forms_dir(&["a.xml"])?;
    let (transport, gate) = GatedTransport::new();
    let screen = Screen::new(dir.path(), transport.clone())?;

    let mut first = screen.surface();
    first.activate()?;
    first.request_download()?;
    let task = Arc::clone(first.task().expect("download bound"));
    first.deactivate();
    assert_eq!(first.phase(), SurfacePhase::Inactive);
    assert!(screen.deps.registry.is_occupied());
    drop(first);

    let mut second = screen.surface();
    second.activate()?;
    assert!(!screen.deps.registry.is_occupied());
    assert!(second.progress_visible());
    assert!(second.task().is_some_and(|held| Arc::ptr_eq(held, &task)));

    let mark = screen.last_event_id();
    gate.fail();
    let result = timeout(WAIT, second.wait_for_download()).await??;
    assert_eq!(result, Some(false));
    assert!(!second.progress_visible());
    assert!(second.task().is_none());

    let events = screen.events_since(mark);
    assert_eq!(finished(&events), [false]);
    assert!(events.contains(&Event::DownloadProgressChanged { running: false }));
    assert_eq!(transport.fetch_count(), 1);
    assert_eq!(
        screen.deps.metrics.snapshot().task_handoffs,
        1,
        "one handoff recorded"
    );
    Ok(())
}

#[tokio::test]
async fn download_finishing_while_torn_down_is_not_replayed() -> Result<()> {
    let dir = forms_dir(&["a.xml"])?;
    let (transport, gate) = GatedTransport::writing_into(dir.path(), "c.xml");
    let screen = Screen::new(dir.path(), transport)?;

    let mut first = screen.surface();
    first.activate()?;
    first.request_download()?;
    let task = Arc::clone(first.task().expect("download bound"));
    first.deactivate();
    drop(first);

    gate.succeed();
    assert!(timeout(WAIT, task.wait_completed()).await?);
    assert_eq!(task.status(), TaskStatus::Completed { success: true });

    let mark = screen.last_event_id();
    let mut second = screen.surface();
    let listed = second.activate()?.clone();
    assert_eq!(listed.names(), ["a.xml", "c.xml"]);
    assert!(!second.progress_visible());
    assert!(second.task().is_none());
    assert!(finished(&screen.events_since(mark)).is_empty());
    assert!(timeout(Duration::from_millis(50), second.next_completion()).await.is_err());
    Ok(())
}

#[tokio::test]
async fn result_queued_before_teardown_is_handled_once() -> Result<()> {
    let dir = forms_dir(&["a.xml"])?;
    let (transport, gate) = GatedTransport::writing_into(dir.path(), "c.xml");
    let screen = Screen::new(dir.path(), transport)?;

    let mut first = screen.surface();
    first.activate()?;
    first.request_download()?;
    let task = Arc::clone(first.task().expect("download bound"));

    gate.succeed();
    assert!(timeout(WAIT, task.wait_completed()).await?);
    first.deactivate();
    assert!(first.task().is_none());
    assert!(!screen.deps.registry.is_occupied());
    drop(first);

    let mut second = screen.surface();
    let listed = second.activate()?.clone();
    assert_eq!(listed.names(), ["a.xml", "c.xml"]);
    assert!(!second.progress_visible());
    assert!(second.task().is_none());

    assert_eq!(finished(&screen.events_since(0)), [true]);
    let metrics = screen.deps.metrics.snapshot();
    assert_eq!(metrics.downloads_succeeded, 1);
    assert_eq!(metrics.task_handoffs, 0);
    Ok(())
}

#[tokio::test]
async fn detached_download_writes_file_without_callback() -> Result<()> {
    let dir = forms_dir(&["a.xml"])?;
    let (transport, gate) = GatedTransport::writing_into(dir.path(), "c.xml");
    let screen = Screen::new(dir.path(), transport)?;

    let mut surface = screen.surface();
    surface.activate()?;
    surface.request_download()?;
    let task = Arc::clone(surface.task().expect("download bound"));
    assert!(surface.abandon_download());

    gate.succeed();
    assert!(timeout(WAIT, task.wait_completed()).await?);

    assert!(timeout(Duration::from_millis(50), surface.next_completion()).await.is_err());
    assert!(finished(&screen.events_since(0)).is_empty());
    assert_eq!(surface.request_refresh()?.names(), ["a.xml", "c.xml"]);
    Ok(())
}

#[tokio::test]
async fn rebuilt_surface_can_start_a_new_download_after_handoff() -> Result<()> {
    let dir = forms_dir(&[])?;
    let (transport, gate) = GatedTransport::writing_into(dir.path(), "c.xml");
    let screen = Screen::new(dir.path(), transport)?;

    let mut first = screen.surface();
    first.activate()?;
    first.request_download()?;
    first.deactivate();
    drop(first);

    let mut second = screen.surface();
    second.activate()?;
    assert!(second.request_download().is_err(), "adopted download still running");

    gate.succeed();
    assert_eq!(timeout(WAIT, second.wait_for_download()).await??, Some(true));
    assert_eq!(second.snapshot().names(), ["c.xml"]);
    assert_eq!(finished(&screen.events_since(0)), [true]);

    let metrics = screen.deps.metrics.snapshot();
    assert_eq!(metrics.downloads_started, 1);
    assert_eq!(metrics.downloads_succeeded, 1);
    Ok(())
}
