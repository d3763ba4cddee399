//! Internal aggregate state guarded by the monitor's lock.

use renderwatch_types::{
    current_timestamp_ms, NetworkEvent, Recommendation, SchemaVersion, Trend, Warning,
    WebVitalsSnapshot,
};

use crate::snapshot::AggregateSnapshot;
use crate::stats::StatsStore;
use crate::window::BoundedLog;

/// Everything the monitor accumulates.
#[derive(Debug)]
pub(crate) struct AggregateState {
    pub stats: StatsStore,
    pub network_log: BoundedLog<NetworkEvent>,
    pub vitals_log: BoundedLog<WebVitalsSnapshot>,
    pub warnings: BoundedLog<Warning>,
    pub recommendations: BoundedLog<Recommendation>,
    pub trends: BoundedLog<Trend>,
}

impl AggregateState {
    pub fn new(log_capacity: usize) -> Self {
        Self {
            stats: StatsStore::new(),
            network_log: BoundedLog::new(log_capacity),
            vitals_log: BoundedLog::new(log_capacity),
            warnings: BoundedLog::new(log_capacity),
            recommendations: BoundedLog::new(log_capacity),
            trends: BoundedLog::new(log_capacity),
        }
    }

    /// Resize every output log, dropping the oldest entries that no longer fit.
    pub fn set_log_capacity(&mut self, capacity: usize) {
        self.network_log.set_capacity(capacity);
        self.vitals_log.set_capacity(capacity);
        self.warnings.set_capacity(capacity);
        self.recommendations.set_capacity(capacity);
        self.trends.set_capacity(capacity);
    }

    /// Copy the current state into a detached snapshot.
    pub fn collect(&self) -> AggregateSnapshot {
        AggregateSnapshot {
            version: SchemaVersion::current(),
            timestamp_ms: current_timestamp_ms(),
            entities: self.stats.entities().clone(),
            slowest_entity: self.stats.slowest().map(str::to_string),
            network_log: self.network_log.to_vec(),
            vitals_log: self.vitals_log.to_vec(),
            warnings: self.warnings.to_vec(),
            recommendations: self.recommendations.to_vec(),
            trends: self.trends.to_vec(),
        }
    }

    /// Clear per-entity statistics, keeping every log.
    pub fn reset_statistics(&mut self) {
        self.stats.reset();
    }

    /// Clear statistics and every log.
    pub fn reset_all(&mut self) {
        self.stats.reset();
        self.network_log.clear();
        self.vitals_log.clear();
        self.warnings.clear();
        self.recommendations.clear();
        self.trends.clear();
    }
}
