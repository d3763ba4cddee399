//! Trend detection against a trailing window.

use renderwatch_types::{MetricEvent, Trend, TrendMetric};
use tracing::debug;

use crate::config::TrendConfig;
use crate::window::BoundedLog;

/// Prior events required before any comparison is made.
const MIN_HISTORY: usize = 2;

/// Compares each new event against the mean of the entity's previous events.
#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    threshold_pct: f64,
    window: usize,
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new(&TrendConfig::default())
    }
}

impl TrendAnalyzer {
    pub fn new(config: &TrendConfig) -> Self {
        Self {
            threshold_pct: config.threshold_pct,
            window: config.window,
        }
    }

    /// Compare `metric` against `history`, then append it to the window.
    ///
    /// `history` holds the entity's prior events, oldest first, and must not
    /// already contain `metric`. The window is trimmed to the configured size
    /// before comparing.
    pub fn analyze(
        &self,
        metric: &MetricEvent,
        history: &mut BoundedLog<MetricEvent>,
    ) -> Vec<Trend> {
        history.set_capacity(self.window);
        let trends = self.compare(metric, history);
        history.push(metric.clone());
        trends
    }

    /// Compare `metric` against `history` without modifying it.
    pub fn compare(&self, metric: &MetricEvent, history: &BoundedLog<MetricEvent>) -> Vec<Trend> {
        if history.len() < MIN_HISTORY {
            return Vec::new();
        }

        let mut trends = Vec::new();

        let render_avg = mean(history.iter().map(|m| m.last_render_time));
        self.check(
            &mut trends,
            TrendMetric::RenderTime,
            metric,
            metric.last_render_time,
            render_avg,
        );

        let unnecessary_avg = mean(history.iter().map(|m| m.unnecessary_renders as f64));
        self.check(
            &mut trends,
            TrendMetric::UnnecessaryRenders,
            metric,
            metric.unnecessary_renders as f64,
            unnecessary_avg,
        );

        // Memory only averages over the events that carried a reading
        if let Some(current) = metric.used_heap() {
            let memory_avg = mean(history.iter().filter_map(|m| m.used_heap()));
            self.check(&mut trends, TrendMetric::MemoryUsage, metric, current, memory_avg);
        }

        trends
    }

    fn check(
        &self,
        trends: &mut Vec<Trend>,
        dimension: TrendMetric,
        metric: &MetricEvent,
        current: f64,
        average: Option<f64>,
    ) {
        let Some(change) = average.and_then(|avg| percent_change(current, avg)) else {
            return;
        };

        if change.abs() > self.threshold_pct {
            debug!(
                entity = %metric.entity_name,
                metric = ?dimension,
                change,
                "trend detected"
            );
            trends.push(Trend::from_change(
                dimension,
                metric.entity_name.clone(),
                change,
                metric.timestamp_ms,
            ));
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Percentage change of `current` relative to `average`; `None` for a zero average.
fn percent_change(current: f64, average: f64) -> Option<f64> {
    if average == 0.0 || !average.is_finite() {
        return None;
    }
    Some((current - average) / average * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderwatch_types::{MemorySnapshot, TrendKind};

    fn render(ms: f64) -> MetricEvent {
        MetricEvent::builder("List")
            .render_count(2)
            .update(ms)
            .timestamp_ms(7)
            .build()
    }

    fn history_of(values: &[f64]) -> BoundedLog<MetricEvent> {
        let mut history = BoundedLog::new(5);
        history.extend(values.iter().map(|&ms| render(ms)));
        history
    }

    #[test]
    fn fewer_than_two_prior_events_yield_nothing() {
        let analyzer = TrendAnalyzer::default();

        assert!(analyzer.compare(&render(500.0), &history_of(&[])).is_empty());
        assert!(analyzer.compare(&render(500.0), &history_of(&[10.0])).is_empty());
    }

    #[test]
    fn doubling_render_time_is_a_degradation() {
        let analyzer = TrendAnalyzer::default();
        let trends = analyzer.compare(&render(200.0), &history_of(&[100.0, 100.0, 100.0, 100.0]));

        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].metric, TrendMetric::RenderTime);
        assert_eq!(trends[0].kind, TrendKind::Degradation);
        assert!((trends[0].change - 100.0).abs() < 1e-9);
        assert_eq!(trends[0].timestamp_ms, 7);
    }

    #[test]
    fn halving_render_time_is_an_improvement() {
        let analyzer = TrendAnalyzer::default();
        let trends = analyzer.compare(&render(50.0), &history_of(&[100.0, 100.0]));

        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].kind, TrendKind::Improvement);
        assert!((trends[0].change + 50.0).abs() < 1e-9);
    }

    #[test]
    fn change_at_threshold_is_not_a_trend() {
        let analyzer = TrendAnalyzer::default();
        assert!(analyzer.compare(&render(120.0), &history_of(&[100.0, 100.0])).is_empty());
    }

    #[test]
    fn zero_average_is_skipped() {
        let analyzer = TrendAnalyzer::default();
        let spike = MetricEvent::builder("List")
            .render_count(3)
            .update(0.0)
            .unnecessary_renders(4)
            .build();

        // Both render time and unnecessary renders average to zero
        let trends = analyzer.compare(&spike, &history_of(&[0.0, 0.0, 0.0]));
        assert!(trends.is_empty());
    }

    #[test]
    fn memory_requires_a_current_reading() {
        let analyzer = TrendAnalyzer::default();
        let mut history = BoundedLog::new(5);
        for _ in 0..3 {
            history.push(
                MetricEvent::builder("List")
                    .render_time(10.0)
                    .memory(MemorySnapshot::new(50.0, 0.0, 0.0, 0))
                    .build(),
            );
        }

        let without = MetricEvent::builder("List").render_time(10.0).build();
        assert!(analyzer.compare(&without, &history).is_empty());

        let with = MetricEvent::builder("List")
            .render_time(10.0)
            .memory(MemorySnapshot::new(80.0, 0.0, 0.0, 0))
            .build();
        let trends = analyzer.compare(&with, &history);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].metric, TrendMetric::MemoryUsage);
        assert!((trends[0].change - 60.0).abs() < 1e-9);
    }

    #[test]
    fn memory_averages_only_entries_with_readings() {
        let analyzer = TrendAnalyzer::default();
        let mut history = BoundedLog::new(5);
        history.push(MetricEvent::builder("List").render_time(10.0).build());
        history.push(
            MetricEvent::builder("List")
                .render_time(10.0)
                .memory(MemorySnapshot::new(100.0, 0.0, 0.0, 0))
                .build(),
        );

        let current = MetricEvent::builder("List")
            .render_time(10.0)
            .memory(MemorySnapshot::new(110.0, 0.0, 0.0, 0))
            .build();

        // 10% over the single reading, below the threshold
        assert!(analyzer.compare(&current, &history).is_empty());
    }

    #[test]
    fn analyze_appends_and_trims_window() {
        let analyzer = TrendAnalyzer::new(&TrendConfig {
            threshold_pct: 20.0,
            window: 3,
        });
        let mut history = BoundedLog::new(10);

        for ms in [1.0, 2.0, 3.0, 4.0] {
            analyzer.analyze(&render(ms), &mut history);
        }

        let kept: Vec<f64> = history.iter().map(|m| m.last_render_time).collect();
        assert_eq!(kept, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn analyze_compares_before_appending() {
        let analyzer = TrendAnalyzer::default();
        let mut history = history_of(&[100.0, 100.0]);

        let trends = analyzer.analyze(&render(200.0), &mut history);

        // Compared against [100, 100], not [100, 100, 200]
        assert!((trends[0].change - 100.0).abs() < 1e-9);
        assert_eq!(history.len(), 3);
    }
}
