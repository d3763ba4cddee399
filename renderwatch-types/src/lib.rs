//! # renderwatch-types
//!
//! Core types for render telemetry. This crate defines the schema that
//! collectors use to report observations to the renderwatch engine, and the
//! records the engine produces for dashboards and exporters.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature as needed
//! - **Producer agnostic**: Any repeatedly-invoked unit of work can be an entity
//! - **Versioned schema**: Snapshots carry version info for forward compatibility
//! - **Ergonomic builders**: Fluent API for constructing events
//!
//! ## Features
//!
//! - `serde`: JSON/TOML/etc. serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use renderwatch_types::{MetricEvent, NetworkEvent};
//!
//! // A mount followed by an update of the same entity
//! let mount = MetricEvent::builder("OrderTable")
//!     .render_count(1)
//!     .mount_time(42.0)
//!     .render_time(42.0)
//!     .timestamp_ms(1_703_160_000_000)
//!     .build();
//!
//! let update = MetricEvent::builder("OrderTable")
//!     .render_count(2)
//!     .update(12.5)
//!     .timestamp_ms(1_703_160_000_100)
//!     .build();
//!
//! assert!(mount.is_mount());
//! assert_eq!(update.update_times, vec![12.5]);
//!
//! let call = NetworkEvent::builder("/api/orders")
//!     .method("POST")
//!     .duration(230.0)
//!     .status(201)
//!     .build();
//! assert!(!call.is_error());
//! ```

mod metric;
mod network;
mod report;
mod version;
mod vitals;

pub use metric::*;
pub use network::*;
pub use report::*;
pub use version::*;
pub use vitals::*;

/// Current schema version.
///
/// Increment this when making breaking changes to the snapshot format.
pub const SCHEMA_VERSION: u32 = 1;

/// Get current timestamp in milliseconds since Unix epoch.
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
