//! Docsift library crate (used by the binary and integration tests).
//!
//! # Public API Surface
//!
//! The exports are organized by module:
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Environment-backed configuration
//! - [`ProcessedDocument`], [`ProcessingStatus`] - Uploaded documents and their pipeline state
//! - [`DocumentStore`], [`FileDocumentStore`], [`MemoryDocumentStore`] - Document tables
//!
//! ## Searching
//! - [`SearchService`], [`KeywordSearchService`] - Ranking backends
//! - [`SearchFilters`], [`SearchOptions`], [`SearchResults`] - Request and response shapes
//! - [`SearchIntelligence`], [`MemorySearchIntelligence`] - Analytics and saved searches
//! - [`DocumentSearcher`], [`SearchState`] - Debounced, cached search with observable state
//!
//! ## Caching
//! - [`SearchCache`], [`SearchCacheHandle`] - TTL + insertion-order result cache
//! - [`CompressedPayload`] - zstd-compressed result sets
//! - Hashing functions for cache keys
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod compression;
pub mod config;
pub mod constants;
pub mod debounce;
pub mod document;
pub mod hashing;
pub mod search;
pub mod searcher;

pub use cache::{
    CacheConfig, CacheEntry, CacheError, CacheLookupResult, CacheResult, CacheStats, CacheStatus,
    SearchCache, SearchCacheHandle,
};
pub use compression::{CompressedPayload, CompressionError, CompressionStats};
pub use config::{Config, ConfigError};
pub use debounce::Debouncer;
pub use document::{
    DocumentAnalysis, DocumentError, DocumentResult, DocumentStore, FileDocumentStore,
    MemoryDocumentStore, ProcessedDocument, ProcessingStatus,
};
pub use hashing::{cache_key, hash_cache_key, hash_search};
#[cfg(any(test, feature = "mock"))]
pub use search::MockSearchService;
pub use search::{
    DocumentMatch, KeywordSearchService, MemorySearchIntelligence, SavedSearch, SearchAnalytics,
    SearchError, SearchFilters, SearchIntelligence, SearchOptions, SearchResult, SearchResults,
    SearchService, SortOrder,
};
pub use searcher::{DocumentSearcher, SearchState, SearcherConfig};
