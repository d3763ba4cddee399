//! Snapshot - a detached, point-in-time view of the aggregate state.

use std::collections::BTreeMap;

use renderwatch_types::{
    NetworkEvent, Recommendation, SchemaVersion, Trend, Warning, WebVitalsSnapshot,
};
use serde::Serialize;

use crate::stats::EntityStats;

/// Copy of everything the monitor has accumulated.
///
/// Snapshots own their data; later activity on the monitor never changes a
/// snapshot that was already taken.
///
/// # Example
///
/// ```rust
/// use renderwatch_core::{MetricEvent, Monitor};
///
/// let monitor = Monitor::new();
/// monitor.record_metric(MetricEvent::builder("List").render_time(4.0).build());
///
/// let snapshot = monitor.snapshot();
/// assert_eq!(snapshot.len(), 1);
/// assert_eq!(snapshot.slowest(), Some("List"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSnapshot {
    /// Schema version for forward compatibility.
    pub version: SchemaVersion,

    /// Unix timestamp in milliseconds when this snapshot was taken.
    pub timestamp_ms: u64,

    /// Statistics per entity, keyed by entity name.
    pub entities: BTreeMap<String, EntityStats>,

    /// Entity with the highest cumulative render time.
    pub slowest_entity: Option<String>,

    pub network_log: Vec<NetworkEvent>,
    pub vitals_log: Vec<WebVitalsSnapshot>,
    pub warnings: Vec<Warning>,
    pub recommendations: Vec<Recommendation>,
    pub trends: Vec<Trend>,
}

impl AggregateSnapshot {
    /// Check if no entity has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of entities in the snapshot.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Get statistics for a specific entity.
    pub fn get(&self, entity: &str) -> Option<&EntityStats> {
        self.entities.get(entity)
    }

    pub fn slowest(&self) -> Option<&str> {
        self.slowest_entity.as_deref()
    }

    /// Render time summed across all entities.
    pub fn total_render_time(&self) -> f64 {
        self.entities.values().map(|s| s.total_render_time).sum()
    }

    /// Unnecessary renders summed across all entities.
    pub fn total_unnecessary_renders(&self) -> u64 {
        self.entities.values().map(|s| s.unnecessary_renders).sum()
    }

    /// Number of entities that have mounted.
    pub fn total_mounts(&self) -> usize {
        self.entities.values().filter(|s| s.mounted).count()
    }

    /// Network calls that errored or returned a failure status.
    pub fn failed_requests(&self) -> impl Iterator<Item = &NetworkEvent> {
        self.network_log.iter().filter(|e| e.status.is_failure())
    }

    /// Most recent vitals reading.
    pub fn latest_vitals(&self) -> Option<&WebVitalsSnapshot> {
        self.vitals_log.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatsStore;
    use renderwatch_types::MetricEvent;

    fn snapshot() -> AggregateSnapshot {
        let mut store = StatsStore::new();
        store.upsert(
            &MetricEvent::builder("A").render_time(10.0).unnecessary_renders(2).build(),
            100,
            5,
        );
        store.upsert(
            &MetricEvent::builder("B").render_time(30.0).unnecessary_renders(1).build(),
            100,
            5,
        );
        store.upsert(
            &MetricEvent::builder("C").render_count(3).update(0.0).build(),
            100,
            5,
        );

        AggregateSnapshot {
            version: SchemaVersion::current(),
            timestamp_ms: 0,
            entities: store.entities().clone(),
            slowest_entity: store.slowest().map(str::to_string),
            network_log: vec![
                NetworkEvent::builder("/ok").build(),
                NetworkEvent::builder("/missing").status(404).build(),
                NetworkEvent::builder("/down").failed("connection refused").build(),
            ],
            vitals_log: Vec::new(),
            warnings: Vec::new(),
            recommendations: Vec::new(),
            trends: Vec::new(),
        }
    }

    #[test]
    fn summary_totals() {
        let snapshot = snapshot();

        assert_eq!(snapshot.total_render_time(), 40.0);
        assert_eq!(snapshot.total_unnecessary_renders(), 3);
        assert_eq!(snapshot.total_mounts(), 2);
        assert_eq!(snapshot.slowest(), Some("B"));
    }

    #[test]
    fn failed_requests_include_errors_and_failure_codes() {
        let snapshot = snapshot();
        let failed: Vec<&str> = snapshot.failed_requests().map(|e| e.url.as_str()).collect();

        assert_eq!(failed, vec!["/missing", "/down"]);
    }

    #[test]
    fn serializes_to_json() {
        let json = serde_json::to_value(snapshot()).unwrap();

        assert_eq!(json["version"]["major"], 1);
        assert_eq!(json["slowest_entity"], "B");
        assert_eq!(json["entities"]["A"]["total_render_time"], 10.0);
    }
}
