//! Fallback values applied when a setting is not provided.

/// Forms directory relative to the working directory.
pub(crate) const FORMS_DIR: &str = "forms";
/// HTTP timeout for form downloads, in seconds.
pub(crate) const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Log filter used when neither the setting nor `RUST_LOG` is present.
pub(crate) const LOG_LEVEL: &str = "info";
