//! Records produced by the engine: warnings, trends and recommendations.

use core::fmt;

/// Which configured limit a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum WarningKind {
    RenderCount,
    MountTime,
    UnnecessaryRenders,
    MemoryUsage,
    NetworkDuration,
}

impl WarningKind {
    /// Stable identifier, e.g. `mount-time`.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::RenderCount => "render-count",
            WarningKind::MountTime => "mount-time",
            WarningKind::UnnecessaryRenders => "unnecessary-renders",
            WarningKind::MemoryUsage => "memory-usage",
            WarningKind::NetworkDuration => "network-duration",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An observed value that exceeded a configured limit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Warning {
    /// Entity the value belongs to. For network warnings this is the URL.
    pub entity_name: String,
    pub kind: WarningKind,
    pub observed_value: f64,
    pub limit: f64,
    /// Timestamp of the event that triggered the warning.
    pub timestamp_ms: u64,
}

/// Direction of a detected trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum TrendKind {
    Improvement,
    Degradation,
}

/// The tracked dimension a trend refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum TrendMetric {
    RenderTime,
    UnnecessaryRenders,
    MemoryUsage,
}

impl TrendMetric {
    /// Human-readable label used in trend messages.
    pub fn label(&self) -> &'static str {
        match self {
            TrendMetric::RenderTime => "Render time",
            TrendMetric::UnnecessaryRenders => "Unnecessary renders",
            TrendMetric::MemoryUsage => "Memory usage",
        }
    }
}

/// A significant move of a metric relative to its trailing average.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trend {
    pub kind: TrendKind,
    pub metric: TrendMetric,
    pub entity_name: String,
    /// Percentage change of the latest value against the trailing average.
    pub change: f64,
    pub message: String,
    pub timestamp_ms: u64,
}

impl Trend {
    /// Build a trend from a percentage change, classifying its direction.
    ///
    /// All tracked dimensions are "lower is better", so an increase is a
    /// degradation.
    pub fn from_change(
        metric: TrendMetric,
        entity_name: impl Into<String>,
        change: f64,
        timestamp_ms: u64,
    ) -> Self {
        let (kind, verb) = if change > 0.0 {
            (TrendKind::Degradation, "increased")
        } else {
            (TrendKind::Improvement, "decreased")
        };

        Self {
            kind,
            metric,
            entity_name: entity_name.into(),
            change,
            message: format!("{} {} by {:.1}%", metric.label(), verb, change.abs()),
            timestamp_ms,
        }
    }
}

/// Severity class of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum RecommendationKind {
    Suggestion,
    Warning,
    Critical,
}

/// An advisory message derived from a metric.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
    pub entity_name: String,
    pub timestamp_ms: u64,
}
