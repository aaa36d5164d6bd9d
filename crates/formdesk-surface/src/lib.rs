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

//! Presentation-facing controller for the forms screen.
//!
//! Layout: `controller.rs` (`SurfaceController` and its dependencies),
//! `handoff.rs` (single-slot registry carrying a running download across a
//! surface rebuild), `prompt.rs` (delete confirmation seam), `state.rs`
//! (selection, pending deletion and lifecycle phase), `error.rs`.

pub mod controller;
pub mod error;
pub mod handoff;
pub mod prompt;
pub mod state;

pub use controller::{SurfaceController, SurfaceDeps};
pub use error::{SurfaceError, SurfaceResult};
pub use handoff::HandoffRegistry;
pub use prompt::{Confirmation, DeleteOutcome, DeletePrompt};
pub use state::{PendingDeletion, SelectionState, SurfacePhase};
