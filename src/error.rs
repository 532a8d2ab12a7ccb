//! Error types shared by configuration, signal assembly, and the simulation loop.

use std::fmt;

use thiserror::Error;

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.capacity_kwh"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    /// Creates a new error for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Fatal errors raised before or while running a simulation.
///
/// Zero-variance normalization and feed outages are recovered locally and
/// never show up here.
#[derive(Debug, Error)]
pub enum SimError {
    /// One or more configuration values were rejected.
    #[error("invalid configuration: {}", join_errors(.0))]
    Config(Vec<ConfigError>),

    /// A required input series has no samples.
    #[error("series `{series}` is empty")]
    EmptySeries { series: &'static str },

    /// An input series does not match the horizon length.
    #[error("series `{series}` has {actual} samples, expected {expected}")]
    LengthMismatch {
        series: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A series required by the configuration was not supplied.
    #[error("series `{series}` is required but missing")]
    MissingSeries { series: &'static str },
}

impl From<ConfigError> for SimError {
    fn from(err: ConfigError) -> Self {
        Self::Config(vec![err])
    }
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}
