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

//! Formdesk application wiring.
//!
//! Layout: `cli.rs` (flags and environment), `bootstrap.rs` (dependency
//! wiring), `shell.rs` (line-oriented UI glue), `error.rs`.

/// Application bootstrap and dependency wiring.
pub mod bootstrap;
/// Command-line flags with environment fallbacks.
pub mod cli;
/// Application-level error type.
pub mod error;
/// Interactive shell driving the forms surface.
pub mod shell;

pub use bootstrap::run_app;
pub use error::{AppError, AppResult};
