//! Sequenced notification bus with a bounded replay ring.
//!
//! # Design
//! - Id assignment, ring insertion and broadcast happen under one lock, so the
//!   ring and every live stream agree on ordering.
//! - [`EventBus::attach`] snapshots the ring and subscribes under that same
//!   lock; a renderer attached after the first listing still prints it, and no
//!   event is seen twice across the seam.
//! - Publishing never waits on subscribers. A stream that falls behind yields a
//!   lag error and can resynchronise with [`EventBus::backlog_since`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::payloads::{DEFAULT_REPLAY_CAPACITY, Event, EventEnvelope, EventId};

/// Live stream of envelopes published after a subscription was taken.
pub type EventStream = BroadcastStream<EventEnvelope>;

/// Retained history plus a live stream that resumes right after it.
pub struct Attachment {
    /// Envelopes still in the replay ring, oldest first.
    pub backlog: Vec<EventEnvelope>,
    /// Envelopes published after `backlog` was taken.
    pub stream: EventStream,
}

/// Cloneable handle to one notification bus.
#[derive(Clone)]
pub struct EventBus {
    state: Arc<Mutex<BusState>>,
    sender: broadcast::Sender<EventEnvelope>,
}

struct BusState {
    next_id: EventId,
    ring: VecDeque<EventEnvelope>,
    capacity: usize,
}

impl BusState {
    fn record(&mut self, event: Event) -> EventEnvelope {
        let envelope = EventEnvelope {
            id: self.next_id,
            timestamp: Utc::now(),
            event,
        };
        self.next_id = self.next_id.saturating_add(1);
        if self.ring.len() == self.capacity {
            let _ = self.ring.pop_front();
        }
        self.ring.push_back(envelope.clone());
        envelope
    }

    fn after(&self, id: EventId) -> Vec<EventEnvelope> {
        self.ring
            .iter()
            .skip_while(|envelope| envelope.id <= id)
            .cloned()
            .collect()
    }
}

impl EventBus {
    /// Bus retaining at most `capacity` envelopes; zero is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            state: Arc::new(Mutex::new(BusState {
                next_id: 1,
                ring: VecDeque::with_capacity(capacity),
                capacity,
            })),
            sender,
        }
    }

    /// Bus retaining [`DEFAULT_REPLAY_CAPACITY`] envelopes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Stream of events published from now on, without history.
    #[must_use]
    pub fn subscribe(&self) -> EventStream {
        BroadcastStream::new(self.sender.subscribe())
    }

    /// Retained history and a stream continuing from its last id.
    #[must_use]
    pub fn attach(&self) -> Attachment {
        let state = self.lock_state();
        let backlog = state.ring.iter().cloned().collect();
        let stream = BroadcastStream::new(self.sender.subscribe());
        drop(state);
        Attachment { backlog, stream }
    }

    /// Record `event`, fan it out, and return its id.
    ///
    /// With no live stream the event only lands in the replay ring.
    pub fn publish(&self, event: Event) -> EventId {
        let mut state = self.lock_state();
        let envelope = state.record(event);
        let id = envelope.id;
        let _ = self.sender.send(envelope);
        drop(state);
        id
    }

    /// Id of the newest retained envelope.
    #[must_use]
    pub fn last_event_id(&self) -> Option<EventId> {
        self.lock_state().ring.back().map(|envelope| envelope.id)
    }

    /// Retained envelopes newer than `id`, oldest first.
    #[must_use]
    pub fn backlog_since(&self, id: EventId) -> Vec<EventEnvelope> {
        self.lock_state().after(id)
    }

    fn lock_state(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    fn ids(envelopes: &[EventEnvelope]) -> Vec<EventId> {
        envelopes.iter().map(|envelope| envelope.id).collect()
    }

    #[test]
    fn backlog_since_skips_seen_ids() {
        let bus = EventBus::with_capacity(4);
        let first = bus.publish(Event::ListUpdated {
            names: vec!["a.xml".into()],
        });
        let second = bus.publish(Event::DownloadProgressChanged { running: true });

        assert_eq!(bus.last_event_id(), Some(second));
        assert_eq!(ids(&bus.backlog_since(first)), [second]);
        assert!(bus.backlog_since(second).is_empty());
    }

    #[test]
    fn full_ring_evicts_oldest_but_ids_keep_counting() {
        let bus = EventBus::with_capacity(2);
        for _ in 0..3 {
            let _ = bus.publish(Event::SelectionRequired);
        }
        assert_eq!(ids(&bus.backlog_since(0)), [2, 3]);
        assert_eq!(bus.publish(Event::SelectionRequired), 4);
    }

    #[test]
    fn zero_capacity_still_retains_latest() {
        let bus = EventBus::with_capacity(0);
        let _ = bus.publish(Event::SelectionRequired);
        let last = bus.publish(Event::DownloadFinished { success: false });
        assert_eq!(ids(&bus.backlog_since(0)), [last]);
    }

    #[test]
    fn empty_bus_has_no_last_id() {
        let bus = EventBus::new();
        assert_eq!(bus.last_event_id(), None);
        assert!(bus.attach().backlog.is_empty());
    }

    #[tokio::test]
    async fn subscribe_sees_only_later_events() {
        let bus = EventBus::new();
        let _ = bus.publish(Event::SelectionRequired);
        let mut stream = bus.subscribe();
        let id = bus.publish(Event::DownloadFinished { success: true });

        let envelope = stream
            .next()
            .await
            .expect("stream item")
            .expect("broadcast ok");
        assert_eq!(envelope.id, id);
        assert_eq!(envelope.event, Event::DownloadFinished { success: true });
    }

    #[tokio::test]
    async fn attach_replays_history_then_continues_live() {
        let bus = EventBus::new();
        let listed = bus.publish(Event::ListUpdated {
            names: vec!["a.xml".into(), "b.xml".into()],
        });

        let Attachment {
            backlog,
            mut stream,
        } = bus.attach();
        assert_eq!(ids(&backlog), [listed]);

        let running = bus.publish(Event::DownloadProgressChanged { running: true });
        let envelope = stream
            .next()
            .await
            .expect("stream item")
            .expect("broadcast ok");
        assert_eq!(envelope.id, running);
    }
}
