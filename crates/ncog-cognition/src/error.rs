//! Error types for the cognitive layers

use thiserror::Error;

/// Result type for cognition operations
pub type Result<T> = std::result::Result<T, CognitionError>;

/// Errors that can occur in the cognitive layers
#[derive(Error, Debug)]
pub enum CognitionError {
    /// Malformed input to the text-generation service
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Reason the input was rejected
        reason: String,
    },

    /// A configured module kind could not be resolved
    #[error("Unknown module kind: {name}")]
    UnknownModule {
        /// The unresolved kind name
        name: String,
    },

    /// Failure in the underlying simulation core
    #[error("Runtime error: {source}")]
    Runtime {
        #[from]
        /// Source runtime error
        source: ncog_runtime::RuntimeError,
    },

    /// Failure in the memory store
    #[error("Memory error: {source}")]
    Memory {
        #[from]
        /// Source memory error
        source: ncog_memory::MemoryError,
    },
}

impl CognitionError {
    /// Create an invalid input error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create an unknown module error
    pub fn unknown_module(name: impl Into<String>) -> Self {
        Self::UnknownModule { name: name.into() }
    }
}
