//! Error types for the core domain.

use thiserror::Error;

/// Failure to interpret bytes read from the exchange segment.
///
/// Every variant means the producer and this client disagree on the binary
/// contract. None of them are transient, so callers should not retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer length does not match the agreed record size
    #[error("Malformed exchange record: expected {expected} bytes, got {actual} bytes")]
    MalformedRecord {
        /// Agreed record size in bytes
        expected: usize,
        /// Length of the buffer that was handed in
        actual: usize,
    },

    /// Root index outside the root-name table
    #[error("Riff root index {0} is outside the root table")]
    RootOutOfRange(u32),

    /// Scale index outside the scale-name table
    #[error("Riff scale index {0} is outside the scale table")]
    ScaleOutOfRange(u32),
}

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No output lines configured
    #[error("Configuration declares no output lines")]
    NoOutputLines,

    /// Colour string is not `#RRGGBB`
    #[error("Output line {line}: invalid hex colour '{value}'")]
    InvalidColour {
        /// Index of the offending line
        line: usize,
        /// The rejected value
        value: String,
    },

    /// Interval must be positive
    #[error("Invalid interval for {0}: must be greater than zero")]
    InvalidInterval(&'static str),

    /// Shared segment name is blank
    #[error("Segment name must not be empty")]
    EmptySegmentName,
}

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// Exchange record could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Configuration rejected
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_record_display() {
        let err = DecodeError::MalformedRecord {
            expected: 472,
            actual: 100,
        };
        let msg = err.to_string();
        assert!(msg.contains("472"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn test_core_error_wraps_decode() {
        let err: CoreError = DecodeError::ScaleOutOfRange(18).into();
        assert!(matches!(err, CoreError::Decode(DecodeError::ScaleOutOfRange(18))));
        assert!(err.to_string().contains("18"));
    }
}
