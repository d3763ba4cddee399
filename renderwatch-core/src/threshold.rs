//! Threshold evaluation.
//!
//! Every configured limit is checked independently, so one event can yield
//! several warnings. Callers are responsible for the enabled / exclude /
//! `include_warnings` gate.

use renderwatch_types::{MetricEvent, NetworkEvent, Warning, WarningKind};

use crate::config::Thresholds;

/// Check a render metric against the limits that apply to its entity.
pub fn evaluate_metric(metric: &MetricEvent, thresholds: &Thresholds) -> Vec<Warning> {
    let checks = [
        (
            WarningKind::RenderCount,
            metric.render_count as f64,
            thresholds.max_render_count.map(|l| l as f64),
        ),
        (
            WarningKind::MountTime,
            metric.mount_time,
            thresholds.max_mount_time,
        ),
        (
            WarningKind::UnnecessaryRenders,
            metric.unnecessary_renders as f64,
            thresholds.max_unnecessary_renders.map(|l| l as f64),
        ),
    ];

    let mut warnings: Vec<Warning> = checks
        .into_iter()
        .filter_map(|(kind, observed, limit)| {
            exceeds(kind, &metric.entity_name, observed, limit?, metric.timestamp_ms)
        })
        .collect();

    // A missing heap reading skips the dimension
    if let (Some(used), Some(limit)) = (metric.used_heap(), thresholds.max_memory_usage) {
        warnings.extend(exceeds(
            WarningKind::MemoryUsage,
            &metric.entity_name,
            used,
            limit,
            metric.timestamp_ms,
        ));
    }

    warnings
}

/// Check a network call against the global duration limit.
pub fn evaluate_network(event: &NetworkEvent, thresholds: &Thresholds) -> Vec<Warning> {
    thresholds
        .max_network_duration
        .and_then(|limit| {
            exceeds(
                WarningKind::NetworkDuration,
                &event.url,
                event.duration,
                limit,
                event.timestamp_ms,
            )
        })
        .into_iter()
        .collect()
}

fn exceeds(
    kind: WarningKind,
    entity_name: &str,
    observed_value: f64,
    limit: f64,
    timestamp_ms: u64,
) -> Option<Warning> {
    (observed_value > limit).then(|| Warning {
        entity_name: entity_name.to_string(),
        kind,
        observed_value,
        limit,
        timestamp_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderwatch_types::MemorySnapshot;

    fn kinds(warnings: &[Warning]) -> Vec<WarningKind> {
        warnings.iter().map(|w| w.kind).collect()
    }

    #[test]
    fn slow_mount_yields_one_warning() {
        let thresholds = Thresholds {
            max_mount_time: Some(100.0),
            ..Thresholds::none()
        };
        let metric = MetricEvent::builder("X")
            .render_count(1)
            .mount_time(150.0)
            .timestamp_ms(42)
            .build();

        let warnings = evaluate_metric(&metric, &thresholds);

        assert_eq!(
            warnings,
            vec![Warning {
                entity_name: "X".to_string(),
                kind: WarningKind::MountTime,
                observed_value: 150.0,
                limit: 100.0,
                timestamp_ms: 42,
            }]
        );
    }

    #[test]
    fn each_violated_limit_is_reported() {
        let metric = MetricEvent::builder("X")
            .render_count(150)
            .unnecessary_renders(9)
            .build();

        let warnings = evaluate_metric(&metric, &Thresholds::default());

        assert_eq!(
            kinds(&warnings),
            vec![WarningKind::RenderCount, WarningKind::UnnecessaryRenders]
        );
    }

    #[test]
    fn value_equal_to_limit_is_not_a_violation() {
        let metric = MetricEvent::builder("X").render_count(100).mount_time(100.0).build();

        assert!(evaluate_metric(&metric, &Thresholds::default()).is_empty());
    }

    #[test]
    fn disabled_limits_are_skipped() {
        let metric = MetricEvent::builder("X")
            .render_count(10_000)
            .mount_time(10_000.0)
            .unnecessary_renders(10_000)
            .memory(MemorySnapshot::new(10_000.0, 0.0, 0.0, 0))
            .build();

        assert!(evaluate_metric(&metric, &Thresholds::none()).is_empty());
    }

    #[test]
    fn memory_checked_only_when_reading_present() {
        let thresholds = Thresholds::default();
        let without = MetricEvent::builder("X").build();
        let with = MetricEvent::builder("X")
            .memory(MemorySnapshot::new(180.0, 200.0, 400.0, 0))
            .build();

        assert!(evaluate_metric(&without, &thresholds).is_empty());
        assert_eq!(kinds(&evaluate_metric(&with, &thresholds)), vec![WarningKind::MemoryUsage]);
    }

    #[test]
    fn slow_network_call_is_attributed_to_url() {
        let event = NetworkEvent::builder("/api/orders").duration(1500.0).timestamp_ms(9).build();

        let warnings = evaluate_network(&event, &Thresholds::default());

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].entity_name, "/api/orders");
        assert_eq!(warnings[0].kind, WarningKind::NetworkDuration);
        assert_eq!(warnings[0].limit, 1000.0);
    }

    #[test]
    fn fast_network_call_is_quiet() {
        let event = NetworkEvent::builder("/api").duration(20.0).build();
        assert!(evaluate_network(&event, &Thresholds::default()).is_empty());
    }
}
