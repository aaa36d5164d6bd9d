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

//! Single-shot form download task with a replaceable completion listener.
//!
//! Layout: `error.rs` (typed failures), `task.rs` (`DownloadTask` state machine
//! and `DownloadListener`), `transport.rs` (`FormTransport` seam and the HTTP
//! implementation).

pub mod error;
pub mod task;
pub mod transport;

pub use error::{DownloadError, DownloadResult};
pub use task::{DownloadListener, DownloadTask, TaskStatus};
pub use transport::{FetchedForm, FormTransport, HttpFormTransport};
