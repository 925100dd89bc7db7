//! Unified error handling for the fitflow library.
//!
//! Per-record problems (a bad timestamp, a missing distance) never surface
//! here: they are logged and the record is skipped. This type is reserved for
//! failures of a whole invocation, such as an undecodable activity store.

use thiserror::Error;

/// Unified error type for fitflow operations.
#[derive(Debug, Error)]
pub enum FitflowError {
    /// Configuration could not be read or decoded
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Activity store or config is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A timestamp string could not be interpreted
    #[error("Invalid timestamp '{value}'")]
    Timestamp { value: String },

    /// Year outside the range chrono can represent
    #[error("Invalid year {year}")]
    InvalidYear { year: i32 },
}

/// Result type alias for fitflow operations.
pub type Result<T> = std::result::Result<T, FitflowError>;

/// Extension trait for converting Option to FitflowError.
pub trait OptionExt<T> {
    /// Convert Option to Result with a timestamp error for `value`.
    fn ok_or_timestamp(self, value: &str) -> Result<T>;

    /// Convert Option to Result with a configuration error.
    fn ok_or_config(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_timestamp(self, value: &str) -> Result<T> {
        self.ok_or_else(|| FitflowError::Timestamp {
            value: value.to_string(),
        })
    }

    fn ok_or_config(self, message: &str) -> Result<T> {
        self.ok_or_else(|| FitflowError::Config {
            message: message.to_string(),
        })
    }
}
