//! The main Monitor type that aggregates render telemetry.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use renderwatch_types::{MetricEvent, NetworkEvent, Warning, WebVitalsSnapshot};
use tracing::{debug, info, warn};

use crate::config::ThresholdConfig;
use crate::error::Result;
use crate::handle::Recorder;
use crate::recommend;
use crate::snapshot::AggregateSnapshot;
use crate::state::AggregateState;
use crate::stats::EntityStats;
use crate::subscriber::{MetricListener, SubscriberRegistry, Subscription};
use crate::threshold;
use crate::trend::TrendAnalyzer;

/// The single entry point for recording telemetry.
///
/// A Monitor owns the aggregate state of one monitoring session. Each call
/// first re-reads the configuration gate (enabled, excluded entities), then
/// updates statistics, evaluates thresholds, analyzes trends and derives
/// recommendations as one transaction under a single lock. While the
/// configuration is disabled every entry point, resets included, is a no-op.
///
/// Listeners are notified after the transaction commits, not between the
/// statistics update and threshold evaluation. When `on_metric` runs, the
/// event's warnings, trends and recommendations are already in the logs, and
/// a snapshot taken from inside the callback contains them. `on_warning`
/// follows once per warning the event produced.
///
/// # Example
///
/// ```rust
/// use renderwatch_core::{MetricEvent, Monitor, ThresholdConfig, Thresholds};
///
/// let config = ThresholdConfig::default().with_thresholds(Thresholds {
///     max_mount_time: Some(100.0),
///     ..Thresholds::none()
/// });
/// let monitor = Monitor::with_config(config).unwrap();
///
/// monitor.record_metric(
///     MetricEvent::builder("Checkout")
///         .render_count(1)
///         .mount_time(150.0)
///         .build(),
/// );
///
/// let snapshot = monitor.snapshot();
/// assert_eq!(snapshot.warnings.len(), 1);
/// assert_eq!(snapshot.warnings[0].limit, 100.0);
/// ```
pub struct Monitor {
    inner: Arc<MonitorInner>,
}

pub(crate) struct MonitorInner {
    config: RwLock<ThresholdConfig>,
    state: Mutex<AggregateState>,
    subscribers: SubscriberRegistry,
}

impl Monitor {
    /// Create a monitor with the default configuration.
    pub fn new() -> Self {
        Self::from_parts(ThresholdConfig::default(), SubscriberRegistry::new())
    }

    /// Create a monitor with a validated configuration.
    pub fn with_config(config: ThresholdConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, SubscriberRegistry::new()))
    }

    /// Create a builder for configuring the monitor.
    pub fn builder() -> MonitorBuilder {
        MonitorBuilder::new()
    }

    fn from_parts(config: ThresholdConfig, subscribers: SubscriberRegistry) -> Self {
        let state = AggregateState::new(config.log_capacity);
        Self {
            inner: Arc::new(MonitorInner {
                config: RwLock::new(config),
                state: Mutex::new(state),
                subscribers,
            }),
        }
    }

    /// Replace the active configuration.
    ///
    /// New limits apply to events recorded afterwards; nothing already
    /// recorded is re-evaluated. An invalid configuration is rejected and the
    /// previous one stays active.
    pub fn configure(&self, config: ThresholdConfig) -> Result<()> {
        self.inner.configure(config)
    }

    /// Copy of the active configuration.
    pub fn config(&self) -> ThresholdConfig {
        self.inner.config.read().clone()
    }

    /// Record a render metric.
    pub fn record_metric(&self, metric: MetricEvent) {
        self.inner.record_metric(metric);
    }

    /// Record a network call.
    pub fn record_network_metric(&self, event: NetworkEvent) {
        self.inner.record_network_metric(event);
    }

    /// Record a page-level vitals reading.
    pub fn record_core_web_vitals(&self, vitals: WebVitalsSnapshot) {
        self.inner.record_core_web_vitals(vitals);
    }

    /// Clear per-entity statistics. Same as [`reset_statistics`](Self::reset_statistics).
    ///
    /// Like every entry point, this is a no-op while the monitor is disabled.
    pub fn reset(&self) {
        self.inner.reset_statistics();
    }

    /// Clear per-entity statistics, keeping the network, vitals, warning,
    /// recommendation and trend logs.
    pub fn reset_statistics(&self) {
        self.inner.reset_statistics();
    }

    /// Clear per-entity statistics and every log.
    pub fn reset_all(&self) {
        self.inner.reset_all();
    }

    /// Register a listener. See [`SubscriberRegistry::subscribe`].
    pub fn subscribe(&self, listener: Arc<dyn MetricListener>) -> Subscription {
        self.inner.subscribers.subscribe(listener)
    }

    /// Collect a detached snapshot of the aggregate state.
    pub fn snapshot(&self) -> AggregateSnapshot {
        self.inner.snapshot()
    }

    /// Statistics for one entity, or `None` if it has not been recorded.
    pub fn entity_stats(&self, name: &str) -> Option<EntityStats> {
        self.inner.entity_stats(name)
    }

    /// Get a handle collectors can hold without keeping the monitor alive.
    pub fn recorder(&self) -> Recorder {
        Recorder::new(Arc::downgrade(&self.inner))
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("config", &*self.inner.config.read())
            .field("subscribers", &self.inner.subscribers)
            .finish()
    }
}

impl MonitorInner {
    fn configure(&self, config: ThresholdConfig) -> Result<()> {
        if let Err(err) = config.validate() {
            warn!(error = %err, "rejected configuration, keeping previous");
            return Err(err);
        }

        let mut active = self.config.write();
        self.state.lock().set_log_capacity(config.log_capacity);
        info!(
            enabled = config.enabled,
            include_warnings = config.include_warnings,
            excluded = config.exclude_entities.len(),
            entity_overrides = config.entity_thresholds.len(),
            "configuration updated"
        );
        *active = config;
        Ok(())
    }

    pub(crate) fn record_metric(&self, metric: MetricEvent) {
        let warnings = {
            let config = self.config.read();
            let entity = metric.entity_name.as_str();

            if !config.enabled {
                return;
            }
            if config.is_excluded(entity) {
                debug!(entity, "entity excluded, dropping metric");
                return;
            }
            if config.log_metrics {
                debug!(
                    entity,
                    render_count = metric.render_count,
                    last_render_time = metric.last_render_time,
                    unnecessary_renders = metric.unnecessary_renders,
                    "metric recorded"
                );
            }

            let thresholds = config.resolve(entity);
            let mut state = self.state.lock();

            state
                .stats
                .upsert(&metric, config.update_times_cap, config.trend.window);

            let warnings = if config.include_warnings {
                threshold::evaluate_metric(&metric, thresholds)
            } else {
                Vec::new()
            };

            let trends = state
                .stats
                .history_mut(entity)
                .map(|history| TrendAnalyzer::new(&config.trend).analyze(&metric, history))
                .unwrap_or_default();

            let recommendations = recommend::for_metric(&metric, thresholds);

            state.warnings.extend(warnings.iter().cloned());
            state.trends.extend(trends);
            state.recommendations.extend(recommendations);
            warnings
        };

        self.subscribers.notify_metric(&metric);
        self.publish_warnings(&warnings);
    }

    pub(crate) fn record_network_metric(&self, event: NetworkEvent) {
        let warnings = {
            let config = self.config.read();
            if !config.enabled {
                return;
            }

            let warnings = if config.include_warnings {
                threshold::evaluate_network(&event, &config.thresholds)
            } else {
                Vec::new()
            };

            let mut state = self.state.lock();
            state.network_log.push(event);
            state.warnings.extend(warnings.iter().cloned());
            warnings
        };

        self.publish_warnings(&warnings);
    }

    pub(crate) fn record_core_web_vitals(&self, vitals: WebVitalsSnapshot) {
        let config = self.config.read();
        if !config.enabled {
            return;
        }

        let recommendations = if config.include_warnings {
            recommend::for_vitals(&vitals)
        } else {
            Vec::new()
        };

        let mut state = self.state.lock();
        state.vitals_log.push(vitals);
        state.recommendations.extend(recommendations);
    }

    pub(crate) fn reset_statistics(&self) {
        {
            let config = self.config.read();
            if !config.enabled {
                return;
            }
            self.state.lock().reset_statistics();
        }
        info!("entity statistics reset");
        self.subscribers.notify_reset();
    }

    pub(crate) fn reset_all(&self) {
        {
            let config = self.config.read();
            if !config.enabled {
                return;
            }
            self.state.lock().reset_all();
        }
        info!("all monitor state reset");
        self.subscribers.notify_reset();
    }

    pub(crate) fn snapshot(&self) -> AggregateSnapshot {
        self.state.lock().collect()
    }

    pub(crate) fn entity_stats(&self, name: &str) -> Option<EntityStats> {
        self.state.lock().stats.get(name).cloned()
    }

    fn publish_warnings(&self, warnings: &[Warning]) {
        for warning in warnings {
            warn!(
                entity = %warning.entity_name,
                kind = %warning.kind,
                observed = warning.observed_value,
                limit = warning.limit,
                "threshold exceeded"
            );
            self.subscribers.notify_warning(warning);
        }
    }
}

/// Builder for configuring a Monitor.
#[derive(Default)]
pub struct MonitorBuilder {
    config: ThresholdConfig,
    listeners: Vec<Arc<dyn MetricListener>>,
}

impl MonitorBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial configuration.
    pub fn config(mut self, config: ThresholdConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a listener before any event is recorded.
    pub fn subscriber(mut self, listener: Arc<dyn MetricListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Build the monitor, validating the configuration.
    pub fn build(self) -> Result<Monitor> {
        self.config.validate()?;

        let subscribers = SubscriberRegistry::new();
        for listener in self.listeners {
            subscribers.subscribe(listener);
        }
        Ok(Monitor::from_parts(self.config, subscribers))
    }
}

impl std::fmt::Debug for MonitorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorBuilder")
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
