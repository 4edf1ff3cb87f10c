//! Error types for value formatting.

use thiserror::Error;

/// Boxed error returned by user-supplied extractors and formatters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while formatting a value.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A registered custom formatter returned an error.
    #[error("Custom formatter failed: {0}")]
    Custom(#[source] BoxError),

    /// An epoch timestamp cannot be represented as a calendar date-time.
    #[error("Epoch {unit} value {value} is outside the representable date range")]
    EpochOutOfRange { value: i64, unit: &'static str },

    /// A date or date-time pattern cannot be rendered.
    #[error("Invalid {kind} pattern: '{pattern}'")]
    InvalidPattern { kind: &'static str, pattern: String },
}
