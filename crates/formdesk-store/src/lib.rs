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

//! Plain-file storage for forms: one directory, listed and pruned on demand.
//!
//! Layout: `error.rs` (typed failures), `model.rs` (listing snapshot),
//! `service.rs` (`FileStore`).

pub mod error;
pub mod model;
pub mod service;

pub use error::{StoreError, StoreResult};
pub use model::FileListSnapshot;
pub use service::FileStore;
