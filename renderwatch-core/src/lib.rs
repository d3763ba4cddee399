//! # renderwatch-core
//!
//! Aggregation, threshold, trend and recommendation engine for render
//! telemetry.
//!
//! Collectors (render profilers, heap pollers, request interceptors) feed
//! timestamped events into a [`Monitor`]. The monitor folds them into
//! per-entity statistics and derives warnings, trends and recommendations
//! that dashboards and exporters read back through snapshots or listeners.
//!
//! ```text
//! collector ──► Monitor ──► gate (enabled? excluded?)
//!                              │
//!                              ▼
//!                      StatsStore::upsert
//!                              │
//!               ┌──────────────┼──────────────────┐
//!               ▼              ▼                  ▼
//!          threshold      TrendAnalyzer       recommend
//!               │              │                  │
//!               └──────► bounded output logs ◄────┘
//!                              │
//!                              ▼
//!               listeners / AggregateSnapshot
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use renderwatch_core::{MetricEvent, Monitor, ThresholdConfig};
//!
//! let config = ThresholdConfig::default().exclude("DevTools");
//! let monitor = Monitor::with_config(config).unwrap();
//! let recorder = monitor.recorder();
//!
//! // Mount, then an update slower than the render-time limit
//! let mount = MetricEvent::builder("ProductList")
//!     .render_count(1)
//!     .mount_time(12.0)
//!     .render_time(12.0)
//!     .build();
//! recorder.record_metric(mount).unwrap();
//!
//! let update = MetricEvent::builder("ProductList")
//!     .render_count(2)
//!     .update(1200.0)
//!     .build();
//! recorder.record_metric(update).unwrap();
//!
//! let snapshot = monitor.snapshot();
//! assert_eq!(snapshot.get("ProductList").unwrap().render_count, 2);
//! assert_eq!(snapshot.recommendations.len(), 1);
//! ```
//!
//! ## Features
//!
//! - **Per-entity limits**: an entity's own threshold set replaces the global one
//! - **Trend detection**: each event is compared with the entity's trailing window
//! - **Isolated listeners**: a failing listener never affects recording
//! - **Bounded memory**: every log is a fixed-capacity FIFO buffer
//! - **Thread-safe**: one lock per monitor guards each event as a single transaction

mod config;
mod error;
mod handle;
mod monitor;
mod recommend;
mod snapshot;
mod state;
mod stats;
mod subscriber;
mod threshold;
mod trend;
mod window;

pub use crate::config::{ThresholdConfig, Thresholds, TrendConfig, ENV_PREFIX};
pub use error::{MonitorError, Result};
pub use handle::Recorder;
pub use monitor::{Monitor, MonitorBuilder};
pub use recommend::{PAGE_ENTITY, POOR_CLS, POOR_FCP_MS, POOR_FID_MS, POOR_LCP_MS};
pub use snapshot::AggregateSnapshot;
pub use stats::{EntityStats, StatsStore};
pub use subscriber::{ListenerResult, MetricListener, SubscriberRegistry, Subscription};
pub use threshold::{evaluate_metric, evaluate_network};
pub use trend::TrendAnalyzer;
pub use window::BoundedLog;

// Re-export types for convenience
pub use renderwatch_types::{
    MemorySnapshot, MetricEvent, MetricEventBuilder, NetworkEvent, NetworkEventBuilder,
    NetworkStatus, Recommendation, RecommendationKind, SchemaVersion, Trend, TrendKind,
    TrendMetric, Warning, WarningKind, WebVitalsBuilder, WebVitalsSnapshot,
};
