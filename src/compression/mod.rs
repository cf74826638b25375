//! Compression gate for cached result sets.
//!
//! Result sets are JSON-encoded; encodings at or above the threshold are zstd-compressed
//! before they are cached. Timestamps travel as RFC 3339 strings, so a round trip yields a
//! structurally equal value.

pub mod error;

pub use error::{CompressionError, CompressionResult};

use serde::{Deserialize, Serialize};

use crate::search::SearchResults;

/// Returns `true` when a payload of `len` bytes should be compressed.
#[inline]
pub fn should_compress(len: usize, threshold: usize) -> bool {
    len >= threshold
}

/// A zstd-compressed JSON encoding of a [`SearchResults`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedPayload {
    data: Vec<u8>,
    original_len: usize,
}

impl CompressedPayload {
    /// Wraps already-compressed bytes. `original_len` sizes the decompression buffer.
    pub(crate) fn from_parts(data: Vec<u8>, original_len: usize) -> Self {
        Self { data, original_len }
    }

    /// Returns the compressed bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the compressed size in bytes.
    #[inline]
    pub fn compressed_len(&self) -> usize {
        self.data.len()
    }

    /// Returns the uncompressed JSON size in bytes.
    #[inline]
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Returns size accounting for this payload.
    pub fn stats(&self) -> CompressionStats {
        CompressionStats {
            original_bytes: self.original_len,
            compressed_bytes: self.data.len(),
        }
    }
}

/// Size accounting for one compressed payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionStats {
    pub original_bytes: usize,
    pub compressed_bytes: usize,
}

impl CompressionStats {
    /// `compressed / original`; `1.0` for empty input.
    pub fn ratio(&self) -> f64 {
        if self.original_bytes == 0 {
            return 1.0;
        }
        self.compressed_bytes as f64 / self.original_bytes as f64
    }

    /// Bytes saved by compression (zero if it grew).
    pub fn saved_bytes(&self) -> usize {
        self.original_bytes.saturating_sub(self.compressed_bytes)
    }
}

/// JSON-encodes `results`.
///
/// Fails on NaN or infinite scores, which JSON cannot carry.
pub fn encode_results(results: &SearchResults) -> CompressionResult<Vec<u8>> {
    ensure_finite_scores(results)?;
    serde_json::to_vec(results).map_err(CompressionError::Encode)
}

fn ensure_finite_scores(results: &SearchResults) -> CompressionResult<()> {
    if let Some(i) = results.matches.iter().position(|m| !m.score.is_finite()) {
        return Err(CompressionError::NonFiniteScore {
            field: format!("matches[{i}].score"),
        });
    }
    if results.filters.min_score.is_some_and(|s| !s.is_finite()) {
        return Err(CompressionError::NonFiniteScore {
            field: "filters.min_score".to_string(),
        });
    }
    Ok(())
}

/// Compresses an already-encoded payload.
pub fn compress_bytes(json: &[u8], level: i32) -> CompressionResult<CompressedPayload> {
    let data = zstd::bulk::compress(json, level).map_err(CompressionError::Compress)?;
    Ok(CompressedPayload {
        data,
        original_len: json.len(),
    })
}

/// Encodes and compresses `results`.
pub fn compress_results(results: &SearchResults, level: i32) -> CompressionResult<CompressedPayload> {
    let json = encode_results(results)?;
    compress_bytes(&json, level)
}

/// Decompresses and decodes a payload produced by [`compress_results`].
pub fn decompress_results(payload: &CompressedPayload) -> CompressionResult<SearchResults> {
    let json = zstd::bulk::decompress(&payload.data, payload.original_len)
        .map_err(CompressionError::Decompress)?;
    if json.len() != payload.original_len {
        return Err(CompressionError::LengthMismatch {
            expected: payload.original_len,
            actual: json.len(),
        });
    }
    serde_json::from_slice(&json).map_err(CompressionError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{DocumentMatch, SearchFilters};
    use chrono::{TimeZone, Utc};

    fn sample_results(matches: usize) -> SearchResults {
        let uploaded_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        SearchResults {
            query: "quarterly revenue".to_string(),
            matches: (0..matches)
                .map(|i| DocumentMatch {
                    document_id: format!("doc-{i}"),
                    document_name: format!("report-{i}.pdf"),
                    score: 1.0 + i as f32 * 0.25,
                    matched_terms: vec!["quarterly".to_string(), "revenue".to_string()],
                    snippet: Some(format!(
                        "…the **quarterly** revenue for region {i} grew compared to last year…"
                    )),
                    content: None,
                    uploaded_at,
                })
                .collect(),
            total_count: matches,
            elapsed_ms: 12,
            filters: SearchFilters::default().with_tag("finance"),
            searched_at: Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_should_compress_boundary() {
        assert!(!should_compress(10 * 1024 - 1, 10 * 1024));
        assert!(should_compress(10 * 1024, 10 * 1024));
        assert!(should_compress(50_000, 10 * 1024));
    }

    #[test]
    fn test_compress_decompress_structural_equality() {
        let results = sample_results(200);

        let payload = compress_results(&results, 6).expect("compress");
        let restored = decompress_results(&payload).expect("decompress");

        assert_eq!(restored, results);
    }

    #[test]
    fn test_timestamps_encode_as_iso_strings() {
        let json = String::from_utf8(encode_results(&sample_results(1)).unwrap()).unwrap();
        assert!(json.contains("\"searched_at\":\"2024-03-02T08:00:00Z\""));
        assert!(json.contains("\"uploaded_at\":\"2024-03-01T12:30:00Z\""));
    }

    #[test]
    fn test_repetitive_payload_shrinks() {
        let payload = compress_results(&sample_results(200), 6).unwrap();
        let stats = payload.stats();

        assert!(stats.original_bytes >= 10 * 1024);
        assert!(stats.compressed_bytes < stats.original_bytes);
        assert!(stats.ratio() < 0.5);
        assert_eq!(
            stats.saved_bytes(),
            stats.original_bytes - stats.compressed_bytes
        );
    }

    #[test]
    fn test_corrupt_payload_fails() {
        let payload = CompressedPayload::from_parts(vec![0xde, 0xad, 0xbe, 0xef], 128);
        assert!(matches!(
            decompress_results(&payload),
            Err(CompressionError::Decompress(_))
        ));
    }

    #[test]
    fn test_payload_records_exact_original_len() {
        let json = encode_results(&sample_results(50)).unwrap();
        let payload = compress_bytes(&json, 6).unwrap();

        assert_eq!(payload.original_len(), json.len());
        assert_eq!(payload.stats().original_bytes, json.len());
        assert_eq!(decompress_results(&payload).unwrap(), sample_results(50));
    }

    #[test]
    fn test_non_json_payload_fails_decode() {
        let payload = compress_bytes(b"definitely not json", 3).unwrap();
        assert!(matches!(
            decompress_results(&payload),
            Err(CompressionError::Decode(_))
        ));
    }

    #[test]
    fn test_non_finite_score_is_rejected() {
        let mut results = sample_results(3);
        results.matches[1].score = f32::NAN;
        assert!(matches!(
            encode_results(&results),
            Err(CompressionError::NonFiniteScore { field }) if field == "matches[1].score"
        ));

        let mut results = sample_results(300);
        results.matches[0].score = f32::INFINITY;
        assert!(compress_results(&results, 6).is_err());

        let mut results = sample_results(1);
        results.filters.min_score = Some(f32::NEG_INFINITY);
        assert!(matches!(
            encode_results(&results),
            Err(CompressionError::NonFiniteScore { field }) if field == "filters.min_score"
        ));
    }

    #[test]
    fn test_stats_empty() {
        let stats = CompressionStats::default();
        assert_eq!(stats.ratio(), 1.0);
        assert_eq!(stats.saved_bytes(), 0);
    }
}
