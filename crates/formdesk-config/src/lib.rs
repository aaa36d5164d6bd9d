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

//! Runtime configuration for the form manager.
//!
//! Layout: `defaults.rs` (fallback values), `model.rs` (raw and validated
//! configuration), `validate.rs` (parsing helpers), `error.rs`.

mod defaults;
pub mod error;
pub mod model;
mod validate;

pub use error::{ConfigError, ConfigResult};
pub use model::{AppConfig, LogFormatSetting, RawConfig};
