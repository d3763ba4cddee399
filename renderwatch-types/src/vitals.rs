//! Page-load vitals.

/// One page-load vitals reading.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WebVitalsSnapshot {
    /// First contentful paint, milliseconds.
    pub fcp: f64,

    /// Largest contentful paint, milliseconds.
    pub lcp: f64,

    /// Cumulative layout shift, unitless.
    pub cls: f64,

    /// First input delay, milliseconds.
    pub fid: f64,

    /// Unix timestamp in milliseconds when the reading was taken.
    pub timestamp_ms: u64,
}

impl WebVitalsSnapshot {
    /// Create a builder.
    pub fn builder() -> WebVitalsBuilder {
        WebVitalsBuilder::default()
    }
}

/// Builder for `WebVitalsSnapshot`.
#[derive(Debug, Default)]
pub struct WebVitalsBuilder {
    fcp: f64,
    lcp: f64,
    cls: f64,
    fid: f64,
    timestamp_ms: Option<u64>,
}

impl WebVitalsBuilder {
    pub fn fcp(mut self, ms: f64) -> Self {
        self.fcp = ms;
        self
    }

    pub fn lcp(mut self, ms: f64) -> Self {
        self.lcp = ms;
        self
    }

    pub fn cls(mut self, shift: f64) -> Self {
        self.cls = shift;
        self
    }

    pub fn fid(mut self, ms: f64) -> Self {
        self.fid = ms;
        self
    }

    /// Set a specific timestamp (milliseconds since Unix epoch).
    pub fn timestamp_ms(mut self, ts: u64) -> Self {
        self.timestamp_ms = Some(ts);
        self
    }

    /// Build the snapshot.
    pub fn build(self) -> WebVitalsSnapshot {
        WebVitalsSnapshot {
            fcp: self.fcp,
            lcp: self.lcp,
            cls: self.cls,
            fid: self.fid,
            timestamp_ms: self.timestamp_ms.unwrap_or_else(crate::current_timestamp_ms),
        }
    }
}
