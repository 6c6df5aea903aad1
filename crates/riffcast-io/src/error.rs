//! Error types for exchange and file I/O.

use riffcast_core::{ConfigError, DecodeError};

/// Result type alias for I/O operations.
pub type Result<T> = std::result::Result<T, IoError>;

/// Error type for segment binding, config loading and file sinks.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No producer has created the segment
    #[error("Shared segment not found: {0}")]
    NotFound(String),

    /// Segment exists but may not be opened for reading
    #[error("Access to shared segment denied: {0}")]
    AccessDenied(String),

    /// Segment is smaller than one exchange record
    #[error("Shared segment {name} too small: expected {expected} bytes, got {actual} bytes")]
    SegmentTooSmall {
        /// Segment name
        name: String,
        /// Record size in bytes
        expected: usize,
        /// Segment size in bytes
        actual: usize,
    },

    /// Segment name cannot be passed to the OS
    #[error("Invalid segment name: {0:?}")]
    InvalidName(String),

    /// Snapshot could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// RON parse failed
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// RON serialization failed
    #[error("RON error: {0}")]
    RonWrite(#[from] ron::Error),

    /// Config file extension not recognised
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// Config file exceeds the size limit
    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge {
        /// File size in bytes
        size: u64,
        /// Limit in bytes
        limit: u64,
    },
}

impl IoError {
    /// Map an OS error from opening segment `name` to the matching variant.
    pub fn from_open_error(name: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(name.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::AccessDenied(name.to_string()),
            _ => Self::Io(err),
        }
    }

    /// True if the producer is simply not running yet
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
