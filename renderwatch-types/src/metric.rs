//! Render metric events and memory snapshots.

/// Bytes per megabyte, used when converting raw heap readings.
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// One timestamped observation of an entity's render behaviour.
///
/// An entity is any repeatedly-invoked unit of work: a UI component, a
/// frame pass, a request handler. Collectors emit one event per render.
///
/// The engine merges events into per-entity statistics: scalar fields
/// overwrite, `update_times` is appended and `total_render_time`
/// accumulates. Producers therefore report the render cost of *this*
/// event in `total_render_time` and the newly observed update durations in
/// `update_times`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricEvent {
    /// Name of the entity this event describes.
    pub entity_name: String,

    /// Number of renders the entity has performed so far (mount included).
    pub render_count: u64,

    /// Mount duration in milliseconds.
    pub mount_time: f64,

    /// Update render durations observed since the previous event, oldest first.
    #[cfg_attr(feature = "serde", serde(default))]
    pub update_times: Vec<f64>,

    /// Duration of the most recent render in milliseconds.
    pub last_render_time: f64,

    /// Render time contributed by this event in milliseconds.
    pub total_render_time: f64,

    /// Renders that happened although none of the entity's inputs changed.
    pub unnecessary_renders: u64,

    /// Unix timestamp in milliseconds when the event was observed.
    pub timestamp_ms: u64,

    /// Heap usage at the time of the event, when the host can measure it.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub memory_usage: Option<MemorySnapshot>,
}

impl MetricEvent {
    /// Create a builder for a metric event of the given entity.
    pub fn builder(entity_name: impl Into<String>) -> MetricEventBuilder {
        MetricEventBuilder::new(entity_name)
    }

    /// Whether this event reports the entity's first render.
    pub fn is_mount(&self) -> bool {
        self.render_count <= 1
    }

    /// Used heap in megabytes, if a memory reading is attached.
    pub fn used_heap(&self) -> Option<f64> {
        self.memory_usage.as_ref().map(|m| m.used_heap)
    }
}

/// Heap usage reading, in megabytes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemorySnapshot {
    /// Heap currently in use.
    pub used_heap: f64,

    /// Heap currently reserved.
    pub total_heap: f64,

    /// Maximum heap the host allows.
    pub heap_limit: f64,

    /// Unix timestamp in milliseconds when the reading was taken.
    pub timestamp_ms: u64,
}

impl MemorySnapshot {
    /// Create a reading from megabyte values.
    pub fn new(used_heap: f64, total_heap: f64, heap_limit: f64, timestamp_ms: u64) -> Self {
        Self {
            used_heap,
            total_heap,
            heap_limit,
            timestamp_ms,
        }
    }

    /// Create a reading from raw byte counts as reported by most runtimes.
    pub fn from_bytes(used: u64, total: u64, limit: u64, timestamp_ms: u64) -> Self {
        Self {
            used_heap: used as f64 / BYTES_PER_MB,
            total_heap: total as f64 / BYTES_PER_MB,
            heap_limit: limit as f64 / BYTES_PER_MB,
            timestamp_ms,
        }
    }

    /// Fraction of the heap limit in use, or `None` when the limit is unknown.
    pub fn utilization(&self) -> Option<f64> {
        (self.heap_limit > 0.0).then(|| self.used_heap / self.heap_limit)
    }
}

/// Builder for `MetricEvent`.
#[derive(Debug)]
pub struct MetricEventBuilder {
    entity_name: String,
    render_count: u64,
    mount_time: f64,
    update_times: Vec<f64>,
    last_render_time: f64,
    total_render_time: f64,
    unnecessary_renders: u64,
    timestamp_ms: Option<u64>,
    memory_usage: Option<MemorySnapshot>,
}

impl MetricEventBuilder {
    /// Create a new builder. The render count starts at 1 (a mount).
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            render_count: 1,
            mount_time: 0.0,
            update_times: Vec::new(),
            last_render_time: 0.0,
            total_render_time: 0.0,
            unnecessary_renders: 0,
            timestamp_ms: None,
            memory_usage: None,
        }
    }

    /// Set the render count.
    pub fn render_count(mut self, count: u64) -> Self {
        self.render_count = count;
        self
    }

    /// Set the mount duration.
    pub fn mount_time(mut self, ms: f64) -> Self {
        self.mount_time = ms;
        self
    }

    /// Record a render of the given duration.
    ///
    /// Sets the last render time and adds the duration to the event's
    /// render time.
    pub fn render_time(mut self, ms: f64) -> Self {
        self.last_render_time = ms;
        self.total_render_time += ms;
        self
    }

    /// Record an update render of the given duration.
    ///
    /// Like [`render_time`](Self::render_time), and also appends the
    /// duration to the event's update times.
    pub fn update(mut self, ms: f64) -> Self {
        self.update_times.push(ms);
        self.render_time(ms)
    }

    /// Replace the update times wholesale.
    pub fn update_times(mut self, times: Vec<f64>) -> Self {
        self.update_times = times;
        self
    }

    /// Set the last render time without touching the total.
    pub fn last_render_time(mut self, ms: f64) -> Self {
        self.last_render_time = ms;
        self
    }

    /// Set the render time contributed by this event.
    pub fn total_render_time(mut self, ms: f64) -> Self {
        self.total_render_time = ms;
        self
    }

    /// Set the unnecessary render count.
    pub fn unnecessary_renders(mut self, count: u64) -> Self {
        self.unnecessary_renders = count;
        self
    }

    /// Attach a heap reading.
    pub fn memory(mut self, snapshot: MemorySnapshot) -> Self {
        self.memory_usage = Some(snapshot);
        self
    }

    /// Set a specific timestamp (milliseconds since Unix epoch).
    pub fn timestamp_ms(mut self, ts: u64) -> Self {
        self.timestamp_ms = Some(ts);
        self
    }

    /// Build the event, stamping it with the current time if none was set.
    pub fn build(self) -> MetricEvent {
        MetricEvent {
            entity_name: self.entity_name,
            render_count: self.render_count,
            mount_time: self.mount_time,
            update_times: self.update_times,
            last_render_time: self.last_render_time,
            total_render_time: self.total_render_time,
            unnecessary_renders: self.unnecessary_renders,
            timestamp_ms: self.timestamp_ms.unwrap_or_else(crate::current_timestamp_ms),
            memory_usage: self.memory_usage,
        }
    }
}
