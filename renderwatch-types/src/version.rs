//! Snapshot schema version.

use crate::SCHEMA_VERSION;

/// Version of the snapshot layout, embedded in every engine snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaVersion {
    /// Incremented on breaking layout changes.
    pub major: u32,

    /// Incremented when fields are added.
    pub minor: u32,
}

impl SchemaVersion {
    /// Version produced by this library.
    pub const fn current() -> Self {
        Self {
            major: SCHEMA_VERSION,
            minor: 0,
        }
    }
}
