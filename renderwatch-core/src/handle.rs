//! Collector handle for recording telemetry.

use std::sync::Weak;

use renderwatch_types::{MetricEvent, NetworkEvent, WebVitalsSnapshot};

use crate::error::{MonitorError, Result};
use crate::monitor::MonitorInner;
use crate::snapshot::AggregateSnapshot;
use crate::stats::EntityStats;

/// A handle collectors use to feed a [`Monitor`](crate::Monitor).
///
/// Handles are cheap to clone and safe to move across threads. They do not
/// keep the monitor alive: once it is dropped, every call fails with
/// [`MonitorError::Inactive`].
///
/// # Example
///
/// ```rust
/// use renderwatch_core::{MetricEvent, Monitor, MonitorError};
///
/// let monitor = Monitor::new();
/// let recorder = monitor.recorder();
///
/// recorder.record_metric(MetricEvent::builder("List").build()).unwrap();
///
/// drop(monitor);
/// assert!(matches!(
///     recorder.record_metric(MetricEvent::builder("List").build()),
///     Err(MonitorError::Inactive)
/// ));
/// ```
#[derive(Clone)]
pub struct Recorder {
    inner: Weak<MonitorInner>,
}

impl Recorder {
    pub(crate) fn new(inner: Weak<MonitorInner>) -> Self {
        Self { inner }
    }

    /// Record a render metric.
    pub fn record_metric(&self, metric: MetricEvent) -> Result<()> {
        self.with(|inner| inner.record_metric(metric))
    }

    /// Record a network call.
    pub fn record_network_metric(&self, event: NetworkEvent) -> Result<()> {
        self.with(|inner| inner.record_network_metric(event))
    }

    /// Record a page-level vitals reading.
    pub fn record_core_web_vitals(&self, vitals: WebVitalsSnapshot) -> Result<()> {
        self.with(|inner| inner.record_core_web_vitals(vitals))
    }

    /// Clear per-entity statistics. No-op while the monitor is disabled.
    pub fn reset(&self) -> Result<()> {
        self.with(|inner| inner.reset_statistics())
    }

    /// Collect a snapshot of the monitor's state.
    pub fn snapshot(&self) -> Result<AggregateSnapshot> {
        self.with(|inner| inner.snapshot())
    }

    /// Statistics for one entity. `Ok(None)` means the entity is unknown.
    pub fn entity_stats(&self, name: &str) -> Result<Option<EntityStats>> {
        self.with(|inner| inner.entity_stats(name))
    }

    /// Whether the monitor behind this handle still exists.
    pub fn is_active(&self) -> bool {
        self.inner.strong_count() > 0
    }

    fn with<T>(&self, f: impl FnOnce(&MonitorInner) -> T) -> Result<T> {
        let inner = self.inner.upgrade().ok_or(MonitorError::Inactive)?;
        Ok(f(&inner))
    }
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("active", &self.is_active())
            .finish()
    }
}
