//! Error types for the monitoring engine.

use thiserror::Error;

/// Errors surfaced by the engine.
///
/// Evaluation edge cases (empty history, zero averages) are not errors; they
/// simply produce no output. Only misconfiguration and use of a dropped
/// engine are reported.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// A configuration value is out of range. The previous configuration
    /// remains active.
    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },

    /// A configuration source could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The handle outlived the monitor it was created from.
    #[error("Monitor is no longer active")]
    Inactive,
}

impl MonitorError {
    pub(crate) fn invalid(field: impl Into<String>, value: impl ToString) -> Self {
        MonitorError::InvalidConfig {
            field: field.into(),
            value: value.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MonitorError>;
