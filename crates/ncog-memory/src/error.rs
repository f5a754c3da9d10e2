//! Error types for the memory store

use thiserror::Error;

/// Result type for memory operations
pub type Result<T> = std::result::Result<T, MemoryError>;

/// Errors that can occur in the memory store
#[derive(Error, Debug)]
pub enum MemoryError {
    /// I/O error while persisting or restoring
    #[error("I/O error: {source}")]
    Io {
        #[from]
        /// Source I/O error
        source: std::io::Error,
    },

    /// Serialization or deserialization failure
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        /// Source serde error
        source: serde_json::Error,
    },

    /// Snapshot file content is not the expected flat string-keyed mapping
    #[error("Invalid snapshot format: {reason}")]
    InvalidFormat {
        /// Reason for invalid format
        reason: String,
    },

    /// The store has no backing file to persist to
    #[error("Store is not file-backed")]
    NotFileBacked,
}

impl MemoryError {
    /// Create an invalid format error
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            reason: reason.into(),
        }
    }
}
