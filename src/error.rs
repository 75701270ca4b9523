//! Error types for pv_forecast

use thiserror::Error;

/// Main error type for pv_forecast
#[derive(Error, Debug)]
pub enum PvForecastError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Resample error: {0}")]
    Resample(String),

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    /// A pipeline step was called with a shape or argument it does not take
    #[error("Step '{step}' expected {expected}, got {found}")]
    ArgumentMismatch {
        step: String,
        expected: String,
        found: String,
    },

    #[error("Length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Index mismatch: {0}")]
    IndexMismatch(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl PvForecastError {
    /// Shorthand for an [`PvForecastError::ArgumentMismatch`]
    pub fn argument_mismatch(
        step: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        PvForecastError::ArgumentMismatch {
            step: step.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Result type alias for pv_forecast operations
pub type Result<T> = std::result::Result<T, PvForecastError>;
