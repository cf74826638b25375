use std::path::PathBuf;
use thiserror::Error;

use super::model::ProcessingStatus;

#[derive(Debug, Error)]
/// Errors returned by the document model and stores.
pub enum DocumentError {
    /// Status change outside the processing pipeline.
    #[error("document {id}: invalid status transition {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: ProcessingStatus,
        to: ProcessingStatus,
    },

    /// No document with this id.
    #[error("document not found: {id}")]
    NotFound { id: String },

    /// Reading or writing the store file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Store snapshot could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Atomic rename of the store snapshot failed.
    #[error("failed to persist store file {path}: {reason}")]
    PersistFailed { path: PathBuf, reason: String },
}

/// Convenience result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;
