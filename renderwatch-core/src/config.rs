//! Engine configuration.
//!
//! A [`ThresholdConfig`] controls the gate (enabled / excluded entities),
//! the limits warnings and recommendations are evaluated against, the trend
//! window and the capacity of the output logs. Every field has a default, so
//! configuration files only need to name what they change:
//!
//! ```toml
//! include_warnings = true
//! exclude_entities = ["DevTools"]
//!
//! [thresholds]
//! max_mount_time = 150.0
//! max_render_time = 24.0
//!
//! [entity_thresholds.HeavyChart]
//! max_render_time = 500.0
//! max_unnecessary_renders = 3
//! max_memory_usage = 50.0
//!
//! [trend]
//! threshold_pct = 25.0
//! window = 8
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "RENDERWATCH";

/// Limits evaluated against incoming events.
///
/// `None` disables a limit. An entity-specific set replaces the global set
/// wholesale for that entity; values are never merged across the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Render count above which a warning is emitted.
    pub max_render_count: Option<u64>,
    /// Mount duration (ms) above which a warning is emitted.
    pub max_mount_time: Option<f64>,
    /// Last render duration (ms) above which a memoization recommendation is made.
    pub max_render_time: Option<f64>,
    /// Unnecessary render count above which a warning and a recommendation are emitted.
    pub max_unnecessary_renders: Option<u64>,
    /// Used heap (MB) above which a warning and a recommendation are emitted.
    pub max_memory_usage: Option<f64>,
    /// Network call duration (ms) above which a warning is emitted.
    pub max_network_duration: Option<f64>,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_render_count: Some(100),
            max_mount_time: Some(100.0),
            max_render_time: Some(1000.0),
            max_unnecessary_renders: Some(5),
            max_memory_usage: Some(100.0),
            max_network_duration: Some(1000.0),
        }
    }
}

impl Thresholds {
    /// A set with every limit disabled.
    pub fn none() -> Self {
        Self {
            max_render_count: None,
            max_mount_time: None,
            max_render_time: None,
            max_unnecessary_renders: None,
            max_memory_usage: None,
            max_network_duration: None,
        }
    }

    fn validate(&self, scope: &str) -> Result<()> {
        let limits = [
            ("max_mount_time", self.max_mount_time),
            ("max_render_time", self.max_render_time),
            ("max_memory_usage", self.max_memory_usage),
            ("max_network_duration", self.max_network_duration),
        ];

        for (name, limit) in limits {
            if let Some(value) = limit {
                if !value.is_finite() || value < 0.0 {
                    return Err(MonitorError::invalid(format!("{scope}.{name}"), value));
                }
            }
        }
        Ok(())
    }
}

/// Trend detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Absolute percentage change that counts as a trend.
    pub threshold_pct: f64,
    /// Number of prior events per entity compared against.
    pub window: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            threshold_pct: 20.0,
            window: 5,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// When false every entry point is a no-op.
    pub enabled: bool,
    /// When false no warnings (and no page-vitals recommendations) are emitted.
    pub include_warnings: bool,
    /// Log every accepted metric at debug level.
    pub log_metrics: bool,
    /// Entities whose events are dropped before any processing.
    pub exclude_entities: BTreeSet<String>,
    /// Global limits.
    pub thresholds: Thresholds,
    /// Entity-specific limits, replacing the global ones for that entity.
    pub entity_thresholds: BTreeMap<String, Thresholds>,
    pub trend: TrendConfig,
    /// Maximum entries kept in each output log.
    pub log_capacity: usize,
    /// Maximum update durations kept per entity.
    pub update_times_cap: usize,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            include_warnings: true,
            log_metrics: false,
            exclude_entities: BTreeSet::new(),
            thresholds: Thresholds::default(),
            entity_thresholds: BTreeMap::new(),
            trend: TrendConfig::default(),
            log_capacity: 1000,
            update_times_cap: 100,
        }
    }
}

impl ThresholdConfig {
    /// Load from a file (format inferred from its extension), with
    /// `RENDERWATCH__*` environment variables layered on top.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Self::environment())
            .build()?;

        let parsed: ThresholdConfig = config.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Load from `RENDERWATCH__*` environment variables only.
    pub fn from_env() -> Result<Self> {
        let config = Config::builder().add_source(Self::environment()).build()?;

        let parsed: ThresholdConfig = config.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("exclude_entities")
            .try_parsing(true)
    }

    /// Check every value is in range.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate("thresholds")?;
        for (entity, thresholds) in &self.entity_thresholds {
            thresholds.validate(&format!("entity_thresholds.{entity}"))?;
        }

        let pct = self.trend.threshold_pct;
        if !pct.is_finite() || pct < 0.0 {
            return Err(MonitorError::invalid("trend.threshold_pct", pct));
        }
        if self.trend.window < 2 {
            return Err(MonitorError::invalid("trend.window", self.trend.window));
        }
        if self.log_capacity == 0 {
            return Err(MonitorError::invalid("log_capacity", self.log_capacity));
        }
        if self.update_times_cap == 0 {
            return Err(MonitorError::invalid("update_times_cap", self.update_times_cap));
        }
        Ok(())
    }

    /// Whether events for this entity are dropped at the gate.
    pub fn is_excluded(&self, entity: &str) -> bool {
        self.exclude_entities.contains(entity)
    }

    /// Limits that apply to an entity: its own set if configured, else the global set.
    pub fn resolve(&self, entity: &str) -> &Thresholds {
        self.entity_thresholds.get(entity).unwrap_or(&self.thresholds)
    }

    /// Add an entity to the exclude list.
    pub fn exclude(mut self, entity: impl Into<String>) -> Self {
        self.exclude_entities.insert(entity.into());
        self
    }

    /// Set entity-specific limits.
    pub fn with_entity_thresholds(
        mut self,
        entity: impl Into<String>,
        thresholds: Thresholds,
    ) -> Self {
        self.entity_thresholds.insert(entity.into(), thresholds);
        self
    }

    /// Replace the global limits.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::io::Write;

    // Tests that read the environment share the process-wide variables.
    static ENV_LOCK: Mutex<()> = parking_lot::const_mutex(());

    struct EnvVars(Vec<&'static str>);

    impl EnvVars {
        fn set(vars: &[(&'static str, &str)]) -> Self {
            for (key, value) in vars {
                std::env::set_var(key, value);
            }
            Self(vars.iter().map(|(key, _)| *key).collect())
        }
    }

    impl Drop for EnvVars {
        fn drop(&mut self) {
            for key in &self.0 {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    fn defaults_are_valid() {
        let config = ThresholdConfig::default();

        assert!(config.enabled);
        assert!(config.include_warnings);
        assert_eq!(config.trend.window, 5);
        assert_eq!(config.trend.threshold_pct, 20.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn negative_limit_is_rejected() {
        let config = ThresholdConfig::default().with_thresholds(Thresholds {
            max_mount_time: Some(-1.0),
            ..Thresholds::default()
        });

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            MonitorError::InvalidConfig { ref field, .. } if field == "thresholds.max_mount_time"
        ));
    }

    #[test]
    fn negative_entity_limit_names_the_entity() {
        let config = ThresholdConfig::default().with_entity_thresholds(
            "Chart",
            Thresholds {
                max_memory_usage: Some(f64::NAN),
                ..Thresholds::none()
            },
        );

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("entity_thresholds.Chart.max_memory_usage"));
    }

    #[test]
    fn degenerate_window_and_capacity_are_rejected() {
        let mut config = ThresholdConfig::default();
        config.trend.window = 1;
        assert!(config.validate().is_err());

        let mut config = ThresholdConfig::default();
        config.log_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = ThresholdConfig::default();
        config.trend.threshold_pct = -5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn entity_thresholds_replace_globals() {
        let heavy = Thresholds {
            max_render_time: Some(500.0),
            ..Thresholds::none()
        };
        let config = ThresholdConfig::default().with_entity_thresholds("Heavy", heavy.clone());

        assert_eq!(config.resolve("Heavy"), &heavy);
        assert_eq!(config.resolve("Heavy").max_mount_time, None);
        assert_eq!(config.resolve("Light"), &Thresholds::default());
    }

    #[test]
    fn exclude_list_membership() {
        let config = ThresholdConfig::default().exclude("DevTools");

        assert!(config.is_excluded("DevTools"));
        assert!(!config.is_excluded("App"));
    }

    #[test]
    fn load_from_toml_file() {
        let _env = ENV_LOCK.lock();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
include_warnings = false
exclude_entities = ["DevTools"]

[thresholds]
max_mount_time = 150.0

[entity_thresholds.chart]
max_render_time = 500.0

[trend]
window = 8
"#
        )
        .unwrap();

        let config = ThresholdConfig::load(file.path()).unwrap();

        assert!(config.enabled);
        assert!(!config.include_warnings);
        assert!(config.is_excluded("DevTools"));
        assert_eq!(config.thresholds.max_mount_time, Some(150.0));
        // Unnamed fields keep their defaults
        assert_eq!(config.thresholds.max_render_count, Some(100));
        assert_eq!(config.resolve("chart").max_render_time, Some(500.0));
        assert_eq!(config.trend.window, 8);
        assert_eq!(config.trend.threshold_pct, 20.0);
    }

    #[test]
    fn load_rejects_invalid_values() {
        let _env = ENV_LOCK.lock();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[thresholds]\nmax_render_time = -3.0").unwrap();

        let err = ThresholdConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, MonitorError::InvalidConfig { .. }));
    }

    #[test]
    fn load_missing_file_is_a_load_error() {
        let _env = ENV_LOCK.lock();
        let err = ThresholdConfig::load("/nonexistent/renderwatch.toml").unwrap_err();
        assert!(matches!(err, MonitorError::Load(_)));
    }

    #[test]
    fn from_env_reads_prefixed_variables() {
        let _env = ENV_LOCK.lock();
        let _vars = EnvVars::set(&[
            ("RENDERWATCH__THRESHOLDS__MAX_MOUNT_TIME", "150"),
            ("RENDERWATCH__EXCLUDE_ENTITIES", "A,B"),
        ]);

        let config = ThresholdConfig::from_env().unwrap();

        assert_eq!(config.thresholds.max_mount_time, Some(150.0));
        assert_eq!(
            config.exclude_entities,
            BTreeSet::from(["A".to_string(), "B".to_string()])
        );
        assert!(config.is_excluded("A"));
        assert!(config.is_excluded("B"));
        assert_eq!(config.thresholds.max_render_count, Thresholds::default().max_render_count);
    }

    #[test]
    fn environment_overrides_file_values() {
        let _env = ENV_LOCK.lock();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[thresholds]\nmax_mount_time = 80.0\n\n[trend]\nwindow = 8").unwrap();
        let _vars = EnvVars::set(&[("RENDERWATCH__THRESHOLDS__MAX_MOUNT_TIME", "150")]);

        let config = ThresholdConfig::load(file.path()).unwrap();

        assert_eq!(config.thresholds.max_mount_time, Some(150.0));
        assert_eq!(config.trend.window, 8);
    }

    #[test]
    fn from_env_without_variables_is_default() {
        let _env = ENV_LOCK.lock();

        let config = ThresholdConfig::from_env().unwrap();

        assert_eq!(config.thresholds.max_mount_time, Thresholds::default().max_mount_time);
        assert!(config.exclude_entities.is_empty());
    }
}
