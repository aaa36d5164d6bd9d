//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Counters only; every label value is a fixed `&'static str`.

use std::sync::Arc;

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{TelemetryError, TelemetryResult};

const OUTCOME_LABEL: &str = "result";

/// Prometheus-backed metrics registry shared by the surface and the binary.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    form_refreshes_total: IntCounterVec,
    form_deletions_total: IntCounterVec,
    form_downloads_started_total: IntCounter,
    form_downloads_finished_total: IntCounterVec,
    task_handoffs_total: IntCounter,
}

/// Point-in-time copy of the counters, for the `metrics` shell command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Successful list refreshes.
    pub refreshes_ok: u64,
    /// Failed list refreshes.
    pub refreshes_failed: u64,
    /// Deletions that removed a file.
    pub deletions_ok: u64,
    /// Deletions that removed nothing.
    pub deletions_failed: u64,
    /// Downloads started.
    pub downloads_started: u64,
    /// Downloads whose result reached an attached surface as success.
    pub downloads_succeeded: u64,
    /// Downloads whose result reached an attached surface as failure.
    pub downloads_failed: u64,
    /// Tasks parked in the handoff registry.
    pub task_handoffs: u64,
}

impl Metrics {
    /// Construct a registry with the formdesk collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// built or registered.
    pub fn new() -> TelemetryResult<Self> {
        let registry = Registry::new();

        let form_refreshes_total = counter_vec(
            "form_refreshes_total",
            "Form list refreshes by outcome",
        )?;
        let form_deletions_total = counter_vec(
            "form_deletions_total",
            "Form deletions by outcome",
        )?;
        let form_downloads_started_total = counter(
            "form_downloads_started_total",
            "Form downloads started",
        )?;
        let form_downloads_finished_total = counter_vec(
            "form_downloads_finished_total",
            "Form download results delivered to a surface by outcome",
        )?;
        let task_handoffs_total = counter(
            "task_handoffs_total",
            "Running downloads parked across a surface rebuild",
        )?;

        register(&registry, "form_refreshes_total", &form_refreshes_total)?;
        register(&registry, "form_deletions_total", &form_deletions_total)?;
        register(
            &registry,
            "form_downloads_started_total",
            &form_downloads_started_total,
        )?;
        register(
            &registry,
            "form_downloads_finished_total",
            &form_downloads_finished_total,
        )?;
        register(&registry, "task_handoffs_total", &task_handoffs_total)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                form_refreshes_total,
                form_deletions_total,
                form_downloads_started_total,
                form_downloads_finished_total,
                task_handoffs_total,
            }),
        })
    }

    /// Count one list refresh.
    pub fn inc_refresh(&self, success: bool) {
        self.inner
            .form_refreshes_total
            .with_label_values(&[outcome(success)])
            .inc();
    }

    /// Count one deletion attempt.
    pub fn inc_deletion(&self, success: bool) {
        self.inner
            .form_deletions_total
            .with_label_values(&[outcome(success)])
            .inc();
    }

    /// Count one started download.
    pub fn inc_download_started(&self) {
        self.inner.form_downloads_started_total.inc();
    }

    /// Count one download result handled by a surface.
    pub fn inc_download_finished(&self, success: bool) {
        self.inner
            .form_downloads_finished_total
            .with_label_values(&[outcome(success)])
            .inc();
    }

    /// Count one task parked for the next surface.
    pub fn inc_task_handoff(&self) {
        self.inner.task_handoffs_total.inc();
    }

    /// Render the registry in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the output is not UTF-8.
    pub fn render(&self) -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.inner.registry.gather(), &mut buffer)
            .map_err(|source| TelemetryError::Render { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::RenderedNotUtf8 { source })
    }

    /// Copy the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = &self.inner;
        let by_outcome = |vec: &IntCounterVec, success: bool| {
            vec.with_label_values(&[outcome(success)]).get()
        };
        MetricsSnapshot {
            refreshes_ok: by_outcome(&inner.form_refreshes_total, true),
            refreshes_failed: by_outcome(&inner.form_refreshes_total, false),
            deletions_ok: by_outcome(&inner.form_deletions_total, true),
            deletions_failed: by_outcome(&inner.form_deletions_total, false),
            downloads_started: inner.form_downloads_started_total.get(),
            downloads_succeeded: by_outcome(&inner.form_downloads_finished_total, true),
            downloads_failed: by_outcome(&inner.form_downloads_finished_total, false),
            task_handoffs: inner.task_handoffs_total.get(),
        }
    }
}

const fn outcome(success: bool) -> &'static str {
    if success { "ok" } else { "failed" }
}

fn counter(name: &'static str, help: &str) -> TelemetryResult<IntCounter> {
    IntCounter::with_opts(Opts::new(name, help))
        .map_err(|source| TelemetryError::counter(name, "build", source))
}

fn counter_vec(name: &'static str, help: &str) -> TelemetryResult<IntCounterVec> {
    IntCounterVec::new(Opts::new(name, help), &[OUTCOME_LABEL])
        .map_err(|source| TelemetryError::counter(name, "build", source))
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> TelemetryResult<()>
where
    C: prometheus::core::Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::counter(name, "register", source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_snapshot_and_render() -> TelemetryResult<()> {
        let metrics = Metrics::new()?;
        metrics.inc_refresh(true);
        metrics.inc_refresh(true);
        metrics.inc_refresh(false);
        metrics.inc_deletion(true);
        metrics.inc_download_started();
        metrics.inc_download_finished(false);
        metrics.inc_task_handoff();

        let snapshot = metrics.snapshot();
        assert_eq!(
            snapshot,
            MetricsSnapshot {
                refreshes_ok: 2,
                refreshes_failed: 1,
                deletions_ok: 1,
                deletions_failed: 0,
                downloads_started: 1,
                downloads_succeeded: 0,
                downloads_failed: 1,
                task_handoffs: 1,
            }
        );

        let rendered = metrics.render()?;
        assert!(rendered.contains("form_refreshes_total{result=\"ok\"} 2"));
        assert!(rendered.contains("form_downloads_started_total 1"));
        assert!(rendered.contains("task_handoffs_total 1"));
        Ok(())
    }

    #[test]
    fn duplicate_registration_names_the_counter() -> TelemetryResult<()> {
        let registry = Registry::new();
        let refreshes = counter("form_refreshes_total", "refreshes")?;
        register(&registry, "form_refreshes_total", &refreshes)?;
        let err = register(&registry, "form_refreshes_total", &refreshes);
        assert!(matches!(
            err,
            Err(TelemetryError::Counter {
                metric: "form_refreshes_total",
                step: "register",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn clones_share_one_registry() -> TelemetryResult<()> {
        let metrics = Metrics::new()?;
        let clone = metrics.clone();
        clone.inc_task_handoff();
        assert_eq!(metrics.snapshot().task_handoffs, 1);
        Ok(())
    }
}
