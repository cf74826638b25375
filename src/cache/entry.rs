use std::time::Duration;

use tokio::time::Instant;

use crate::compression::{
    CompressedPayload, CompressionResult, compress_bytes, decompress_results, encode_results,
    should_compress,
};
use crate::search::SearchResults;

/// Stored form of a result set: exactly one of raw or compressed.
#[derive(Debug, Clone, PartialEq)]
pub enum CachePayload {
    Raw(SearchResults),
    Compressed(CompressedPayload),
}

/// A cached result set plus its insertion time.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    payload: CachePayload,
    inserted_at: Instant,
}

impl CacheEntry {
    /// Creates an uncompressed entry stamped now.
    pub fn raw(results: SearchResults) -> Self {
        Self {
            payload: CachePayload::Raw(results),
            inserted_at: Instant::now(),
        }
    }

    /// Creates a compressed entry stamped now.
    pub fn compressed(payload: CompressedPayload) -> Self {
        Self {
            payload: CachePayload::Compressed(payload),
            inserted_at: Instant::now(),
        }
    }

    /// Runs the compression gate: results whose JSON encoding is at least `threshold` bytes
    /// are stored compressed, everything else raw.
    pub fn gated(results: SearchResults, threshold: usize, level: i32) -> CompressionResult<Self> {
        let json = encode_results(&results)?;
        if should_compress(json.len(), threshold) {
            Ok(Self::compressed(compress_bytes(&json, level)?))
        } else {
            Ok(Self::raw(results))
        }
    }

    /// Returns the stored payload.
    #[inline]
    pub fn payload(&self) -> &CachePayload {
        &self.payload
    }

    /// Returns `true` if the payload is compressed.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        matches!(self.payload, CachePayload::Compressed(_))
    }

    /// Returns when the entry was stored.
    #[inline]
    pub fn inserted_at(&self) -> Instant {
        self.inserted_at
    }

    /// Returns the time since the entry was stored.
    #[inline]
    pub fn age(&self) -> Duration {
        self.inserted_at.elapsed()
    }

    /// Returns `true` once the entry is older than `ttl`.
    #[inline]
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }

    /// Returns the stored results, decompressing if needed.
    pub fn results(&self) -> CompressionResult<SearchResults> {
        match &self.payload {
            CachePayload::Raw(results) => Ok(results.clone()),
            CachePayload::Compressed(payload) => decompress_results(payload),
        }
    }
}
