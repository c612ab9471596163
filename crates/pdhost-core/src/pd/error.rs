//! Error types for Pure Data integration
//!
//! Only lifecycle and graph-editing operations can fail. GUI accessors
//! degrade to defaults instead of returning errors.

use std::path::PathBuf;
use thiserror::Error;

use super::native::ObjectId;

/// Errors that can occur during PD operations
#[derive(Debug, Error)]
pub enum PdError {
    /// The process-wide environment was already torn down
    #[error("Pd environment was already torn down for this process")]
    AlreadyTornDown,

    /// Failed to create an interpreter instance
    #[error("Failed to create Pd instance: {0}")]
    InstanceCreationFailed(String),

    /// Failed to add a directory to the search path
    #[error("Failed to add search path '{path}': {reason}")]
    SearchPathFailed { path: PathBuf, reason: String },

    /// Failed to send a message into the runtime
    #[error("Failed to send {msg_type} to '{receiver}': {reason}")]
    SendFailed {
        msg_type: String,
        receiver: String,
        reason: String,
    },

    /// Handle is null, stale, or not of the expected layout
    #[error("Invalid object handle {0}")]
    InvalidHandle(ObjectId),
}

/// Result type for PD operations
pub type PdResult<T> = Result<T, PdError>;
