//! # Design
//!
//! - Centralize application-level errors for bootstrap and the shell.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use std::io;

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration validation failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: formdesk_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: formdesk_telemetry::TelemetryError,
    },
    /// Forms directory operations failed.
    #[error("forms directory operation failed")]
    Store {
        /// Operation identifier.
        operation: &'static str,
        /// Source store error.
        source: formdesk_store::StoreError,
    },
    /// Download setup failed.
    #[error("download operation failed")]
    Download {
        /// Operation identifier.
        operation: &'static str,
        /// Source download error.
        source: formdesk_download::DownloadError,
    },
    /// Surface operations failed.
    #[error("surface operation failed")]
    Surface {
        /// Operation identifier.
        operation: &'static str,
        /// Source surface error.
        source: formdesk_surface::SurfaceError,
    },
    /// Terminal IO failed.
    #[error("io operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Source IO error.
        source: io::Error,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: formdesk_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: formdesk_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn store(operation: &'static str, source: formdesk_store::StoreError) -> Self {
        Self::Store { operation, source }
    }

    pub(crate) const fn download(
        operation: &'static str,
        source: formdesk_download::DownloadError,
    ) -> Self {
        Self::Download { operation, source }
    }

    pub(crate) const fn surface(
        operation: &'static str,
        source: formdesk_surface::SurfaceError,
    ) -> Self {
        Self::Surface { operation, source }
    }

    pub(crate) const fn io(operation: &'static str, source: io::Error) -> Self {
        Self::Io { operation, source }
    }
}
