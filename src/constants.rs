//! Cross-cutting, shared constants.
//!
//! Cache and debounce tunables live here so the config layer, the cache and the
//! searcher agree on defaults. Derive secondary values from primary ones to avoid drift.

/// Time-to-live of a cached result set.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;

/// Maximum number of cached result sets before the oldest insert is evicted.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 50;

/// Serialized payloads at or above this size are compressed before caching.
pub const DEFAULT_COMPRESSION_THRESHOLD_BYTES: usize = 10 * 1024;

/// zstd level used by the compression gate.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 6;

/// Quiet period after the last keystroke before a debounced search runs.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Queries shorter than this (in characters, after trimming) never hit the service.
pub const DEFAULT_MIN_QUERY_LEN: usize = 2;

/// Number of distinct recent queries kept by the searcher.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Default page size for a search.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Documents untouched for this long are removed by store cleanup.
pub const DEFAULT_DOCUMENT_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Characters of context kept on each side of a highlighted snippet match.
pub const SNIPPET_CONTEXT_CHARS: usize = 60;
