#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Notification bus between the form manager core and its presentation glue.
//!
//! Every notification gets a sequential id and lands in a bounded replay ring.
//! A renderer attaching late receives the retained history first and then the
//! live stream, so the initial listing is not lost to start-up ordering.
//!
//! Layout: `payloads.rs` (event types), `routing.rs` (the bus itself).

pub mod payloads;
pub mod routing;

pub use payloads::{DEFAULT_REPLAY_CAPACITY, Event, EventEnvelope, EventId};
pub use routing::{Attachment, EventBus, EventStream};
