//! TTL cache for search result sets.

pub mod config;
pub mod entry;
pub mod error;
pub mod search_cache;
pub mod types;

#[cfg(test)]
mod search_cache_tests;

pub use config::CacheConfig;
pub use entry::{CacheEntry, CachePayload};
pub use error::{CacheError, CacheResult};
pub use search_cache::{SearchCache, SearchCacheHandle};
pub use types::{CacheLookupResult, CacheStats, CacheStatus};
