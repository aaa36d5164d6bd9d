//! Failures raised while wiring logging and the counters registry.

use std::string::FromUtf8Error;

use thiserror::Error;
use tracing_subscriber::util::TryInitError;

/// Result alias for telemetry setup and rendering.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Errors raised by telemetry helpers.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global logger was already installed, or installing it failed.
    #[error("logger install failed")]
    LoggerInstall {
        /// Underlying subscriber error.
        #[source]
        source: TryInitError,
    },
    /// A counter could not be built or added to the registry.
    #[error("counter setup failed")]
    Counter {
        /// Counter name.
        metric: &'static str,
        /// Setup step that failed (`build` or `register`).
        step: &'static str,
        /// Underlying Prometheus error.
        #[source]
        source: prometheus::Error,
    },
    /// Encoding the registry in text exposition format failed.
    #[error("metrics render failed")]
    Render {
        /// Underlying Prometheus error.
        #[source]
        source: prometheus::Error,
    },
    /// The encoder produced bytes that are not UTF-8.
    #[error("rendered metrics were not utf-8")]
    RenderedNotUtf8 {
        /// Underlying conversion error.
        #[source]
        source: FromUtf8Error,
    },
}

impl TelemetryError {
    pub(crate) const fn counter(
        metric: &'static str,
        step: &'static str,
        source: prometheus::Error,
    ) -> Self {
        Self::Counter {
            metric,
            step,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn counter_error_keeps_metric_and_step() {
        let err = TelemetryError::counter(
            "form_refreshes_total",
            "register",
            prometheus::Error::AlreadyReg,
        );
        assert_eq!(err.to_string(), "counter setup failed");
        assert!(matches!(
            err,
            TelemetryError::Counter {
                metric: "form_refreshes_total",
                step: "register",
                ..
            }
        ));
        assert!(err.source().is_some());
    }

    #[test]
    fn render_errors_expose_source() {
        let Err(utf8) = String::from_utf8(vec![0, 159]) else {
            panic!("invalid utf-8 accepted");
        };
        let cases = [
            (
                TelemetryError::Render {
                    source: prometheus::Error::Msg("encoder closed".into()),
                },
                "metrics render failed",
            ),
            (
                TelemetryError::RenderedNotUtf8 { source: utf8 },
                "rendered metrics were not utf-8",
            ),
        ];
        for (err, message) in cases {
            assert_eq!(err.to_string(), message);
            assert!(err.source().is_some());
        }
    }
}
