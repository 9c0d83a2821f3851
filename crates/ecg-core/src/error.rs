//! Error handling for the ECG simulation engine

use thiserror::Error;

/// Result type alias for ECG engine operations
pub type EcgResult<T> = Result<T, EcgError>;

/// Errors surfaced to callers of the engine.
///
/// Degenerate waveform bands and stale scheduler ticks are recovered where
/// they happen and never show up here.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum EcgError {
    /// A clinical or sampling input cannot be used for synthesis
    #[error("Invalid parameter {field}: {value} ({reason})")]
    InvalidParameter {
        /// Name of the offending field
        field: &'static str,
        /// Value that was rejected
        value: f32,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Engine or scheduler configuration is malformed
    #[error("Configuration error: {reason}")]
    Configuration {
        reason: String,
    },

    /// Boundary payload could not be (de)serialized
    #[error("Serialization error: {reason}")]
    Serialization {
        reason: String,
    },
}

impl EcgError {
    /// Shorthand for an `InvalidParameter` error
    pub fn invalid(field: &'static str, value: f32, reason: &'static str) -> Self {
        EcgError::InvalidParameter { field, value, reason }
    }
}

/// Convenience macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::error::EcgError::Configuration {
            reason: format!($($arg)*),
        }
    };
}
