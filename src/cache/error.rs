use thiserror::Error;

use crate::compression::CompressionError;

#[derive(Debug, Error)]
/// Errors returned by the result cache.
pub enum CacheError {
    /// Filters or options could not be encoded into a key.
    #[error("failed to build cache key: {0}")]
    Key(#[from] serde_json::Error),

    /// The compression gate failed while storing an entry.
    #[error("compression error: {0}")]
    Compression(#[from] CompressionError),

    /// Invalid configuration.
    #[error("configuration error: {reason}")]
    Config {
        /// Error message.
        reason: String,
    },
}

/// Convenience result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
