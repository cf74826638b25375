use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the compression gate.
pub enum CompressionError {
    /// Result set could not be JSON-encoded.
    #[error("failed to encode results: {0}")]
    Encode(#[source] serde_json::Error),

    /// A score is NaN or infinite; JSON would encode it as `null` and the payload
    /// could not be decoded again.
    #[error("non-finite score in {field}")]
    NonFiniteScore { field: String },

    /// zstd compression failed.
    #[error("compression failed: {0}")]
    Compress(#[source] std::io::Error),

    /// zstd decompression failed (corrupt or truncated payload).
    #[error("decompression failed: {0}")]
    Decompress(#[source] std::io::Error),

    /// Decompressed size differs from the recorded original size.
    #[error("decompressed {actual} bytes, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Decompressed bytes are not a valid result set.
    #[error("failed to decode results: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Convenience result type for compression operations.
pub type CompressionResult<T> = Result<T, CompressionError>;
