//! Per-entity statistics.

use std::collections::BTreeMap;

use renderwatch_types::{MemorySnapshot, MetricEvent};
use serde::Serialize;

use crate::window::BoundedLog;

/// Accumulated statistics for one entity.
///
/// Created on the entity's first accepted event and only removed by a reset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityStats {
    pub entity_name: String,
    /// Render count reported by the latest event.
    pub render_count: u64,
    /// Mount duration reported by the latest mount event.
    pub mount_time: f64,
    /// Whether a mount event has been seen for the entity.
    pub mounted: bool,
    /// Update durations across all events, oldest first.
    pub update_times: BoundedLog<f64>,
    pub last_render_time: f64,
    /// Render time summed over every event ever recorded for the entity.
    pub total_render_time: f64,
    pub unnecessary_renders: u64,
    /// Timestamp of the latest event.
    pub timestamp_ms: u64,
    /// Latest heap reading seen for the entity.
    pub memory_usage: Option<MemorySnapshot>,
    /// Trailing window of prior events, maintained by the trend analyzer.
    pub history: BoundedLog<MetricEvent>,
}

impl EntityStats {
    fn new(entity_name: &str, update_times_cap: usize, window: usize) -> Self {
        Self {
            entity_name: entity_name.to_string(),
            render_count: 0,
            mount_time: 0.0,
            mounted: false,
            update_times: BoundedLog::new(update_times_cap),
            last_render_time: 0.0,
            total_render_time: 0.0,
            unnecessary_renders: 0,
            timestamp_ms: 0,
            memory_usage: None,
            history: BoundedLog::new(window),
        }
    }

    /// Fold an event into the statistics.
    ///
    /// Scalars overwrite, update times append, render time accumulates. The
    /// mount time only changes on mount events and a missing heap reading
    /// keeps the previous one.
    fn merge(&mut self, metric: &MetricEvent, update_times_cap: usize) {
        self.render_count = metric.render_count;
        if metric.is_mount() {
            self.mount_time = metric.mount_time;
            self.mounted = true;
        }

        self.update_times.set_capacity(update_times_cap);
        self.update_times.extend(metric.update_times.iter().copied());

        self.last_render_time = metric.last_render_time;
        self.total_render_time += metric.total_render_time;
        self.unnecessary_renders = metric.unnecessary_renders;
        self.timestamp_ms = metric.timestamp_ms;
        if let Some(memory) = metric.memory_usage {
            self.memory_usage = Some(memory);
        }
    }

    /// Mean of the recorded update durations.
    pub fn average_update_time(&self) -> Option<f64> {
        if self.update_times.is_empty() {
            return None;
        }
        Some(self.update_times.iter().sum::<f64>() / self.update_times.len() as f64)
    }
}

/// Map of entity name to statistics, tracking the slowest entity.
#[derive(Debug, Clone, Default)]
pub struct StatsStore {
    entities: BTreeMap<String, EntityStats>,
    slowest: Option<String>,
}

impl StatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or update the entity's statistics and return them.
    ///
    /// `window` only sizes the trailing window of a newly created entry.
    pub fn upsert(
        &mut self,
        metric: &MetricEvent,
        update_times_cap: usize,
        window: usize,
    ) -> &EntityStats {
        let name = &metric.entity_name;
        self.entities
            .entry(name.clone())
            .or_insert_with(|| EntityStats::new(name, update_times_cap, window))
            .merge(metric, update_times_cap);

        self.slowest = Self::find_slowest(&self.entities);
        &self.entities[name]
    }

    fn find_slowest(entities: &BTreeMap<String, EntityStats>) -> Option<String> {
        entities
            .values()
            .fold(None::<&EntityStats>, |slowest, stats| match slowest {
                Some(s) if s.total_render_time >= stats.total_render_time => Some(s),
                _ => Some(stats),
            })
            .map(|s| s.entity_name.clone())
    }

    pub fn get(&self, name: &str) -> Option<&EntityStats> {
        self.entities.get(name)
    }

    /// Trailing window of an entity, if it has been seen.
    pub fn history_mut(&mut self, name: &str) -> Option<&mut BoundedLog<MetricEvent>> {
        self.entities.get_mut(name).map(|stats| &mut stats.history)
    }

    /// Name of the entity with the highest cumulative render time.
    pub fn slowest(&self) -> Option<&str> {
        self.slowest.as_deref()
    }

    pub fn entities(&self) -> &BTreeMap<String, EntityStats> {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Remove every entity.
    pub fn reset(&mut self) {
        self.entities.clear();
        self.slowest = None;
    }
}
