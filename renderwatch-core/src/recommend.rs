//! Recommendation generation.
//!
//! Render metrics are checked against the entity's resolved limits. Page-level
//! vitals are checked against fixed limits that are not configurable.

use renderwatch_types::{MetricEvent, Recommendation, RecommendationKind, WebVitalsSnapshot};

use crate::config::Thresholds;

/// Entity name attached to page-level recommendations.
pub const PAGE_ENTITY: &str = "Page";

/// First contentful paint (ms) considered poor.
pub const POOR_FCP_MS: f64 = 1800.0;
/// Largest contentful paint (ms) considered poor.
pub const POOR_LCP_MS: f64 = 2500.0;
/// Cumulative layout shift considered poor.
pub const POOR_CLS: f64 = 0.1;
/// First input delay (ms) considered poor.
pub const POOR_FID_MS: f64 = 100.0;

/// Recommendations for a render metric. Each rule is evaluated independently.
pub fn for_metric(metric: &MetricEvent, thresholds: &Thresholds) -> Vec<Recommendation> {
    let mut out = Vec::new();
    let entity = &metric.entity_name;
    let ts = metric.timestamp_ms;

    if let Some(limit) = thresholds.max_render_time {
        if metric.last_render_time > limit {
            out.push(recommendation(
                RecommendationKind::Warning,
                format!(
                    "High render time detected ({:.2}ms). Consider memoizing the render output.",
                    metric.last_render_time
                ),
                entity,
                ts,
            ));
        }
    }

    if let Some(limit) = thresholds.max_unnecessary_renders {
        if metric.unnecessary_renders > limit {
            out.push(recommendation(
                RecommendationKind::Suggestion,
                format!(
                    "{} unnecessary renders. Cache derived values keyed on their dependencies.",
                    metric.unnecessary_renders
                ),
                entity,
                ts,
            ));
        }
    }

    if let (Some(used), Some(limit)) = (metric.used_heap(), thresholds.max_memory_usage) {
        if used > limit {
            out.push(recommendation(
                RecommendationKind::Critical,
                format!(
                    "High memory usage ({used:.2}MB). Virtualize or page large collections."
                ),
                entity,
                ts,
            ));
        }
    }

    out
}

/// Recommendations for a page-level vitals snapshot.
pub fn for_vitals(vitals: &WebVitalsSnapshot) -> Vec<Recommendation> {
    let checks = [
        (
            vitals.fcp > POOR_FCP_MS,
            format!(
                "Slow first contentful paint ({:.0}ms). Reduce render-blocking resources.",
                vitals.fcp
            ),
        ),
        (
            vitals.lcp > POOR_LCP_MS,
            format!(
                "Slow largest contentful paint ({:.0}ms). Optimize the largest visible element.",
                vitals.lcp
            ),
        ),
        (
            vitals.cls > POOR_CLS,
            format!(
                "High cumulative layout shift ({:.3}). Reserve space for late-loading content.",
                vitals.cls
            ),
        ),
        (
            vitals.fid > POOR_FID_MS,
            format!(
                "High first input delay ({:.0}ms). Break up long main-thread tasks.",
                vitals.fid
            ),
        ),
    ];

    checks
        .into_iter()
        .filter(|(poor, _)| *poor)
        .map(|(_, message)| {
            recommendation(
                RecommendationKind::Warning,
                message,
                PAGE_ENTITY,
                vitals.timestamp_ms,
            )
        })
        .collect()
}

fn recommendation(
    kind: RecommendationKind,
    message: String,
    entity_name: &str,
    timestamp_ms: u64,
) -> Recommendation {
    Recommendation {
        kind,
        message,
        entity_name: entity_name.to_string(),
        timestamp_ms,
    }
}
