//! TTL result cache with insertion-order eviction.
//!
//! Keys are BLAKE3 digests of (query, filters, options). When the cache is full, inserting a
//! new key evicts the earliest-inserted entry; replacing an existing key keeps its position.
//! Expired entries are removed lazily on lookup (or eagerly via [`SearchCache::purge_expired`]).

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

use super::config::CacheConfig;
use super::entry::CacheEntry;
use super::error::CacheResult;
use super::types::{CacheLookupResult, CacheStats};
use crate::hashing::{hash_search, key_hex};
use crate::search::{SearchFilters, SearchOptions, SearchResults};

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<[u8; 32], CacheEntry>,
    order: VecDeque<[u8; 32]>,
    stats: CacheStats,
}

impl CacheInner {
    fn remove(&mut self, hash: &[u8; 32]) -> Option<CacheEntry> {
        let entry = self.entries.remove(hash)?;
        if let Some(pos) = self.order.iter().position(|h| h == hash) {
            self.order.remove(pos);
        }
        Some(entry)
    }

    fn evict_oldest(&mut self) -> Option<[u8; 32]> {
        let oldest = self.order.pop_front()?;
        self.entries.remove(&oldest);
        self.stats.evictions += 1;
        Some(oldest)
    }
}

/// In-memory result cache keyed by search parameters.
pub struct SearchCache {
    config: CacheConfig,
    inner: Mutex<CacheInner>,
}

impl SearchCache {
    /// Creates a cache with [`CacheConfig::default`].
    pub fn new() -> Self {
        Self {
            config: CacheConfig::default(),
            inner: Mutex::new(CacheInner::default()),
        }
    }

    /// Creates a cache after validating `config`.
    pub fn with_config(config: CacheConfig) -> CacheResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            inner: Mutex::new(CacheInner::default()),
        })
    }

    /// Returns the cache config.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Looks up the results cached for a search.
    pub fn lookup(
        &self,
        query: &str,
        filters: &SearchFilters,
        options: &SearchOptions,
    ) -> CacheResult<CacheLookupResult> {
        let hash = hash_search(query, filters, options)?;
        Ok(self.lookup_by_hash(&hash))
    }

    /// Looks up an entry by a precomputed key digest.
    #[instrument(skip(self, hash), fields(key = %key_hex(hash)))]
    pub fn lookup_by_hash(&self, hash: &[u8; 32]) -> CacheLookupResult {
        let mut inner = self.inner.lock();

        let Some(entry) = inner.entries.get(hash) else {
            inner.stats.misses += 1;
            return CacheLookupResult::Miss;
        };

        if entry.is_expired(self.config.ttl) {
            debug!(age_ms = entry.age().as_millis() as u64, "Cache entry expired");
            inner.remove(hash);
            inner.stats.expirations += 1;
            inner.stats.misses += 1;
            return CacheLookupResult::Expired;
        }

        let compressed = entry.is_compressed();
        match entry.results() {
            Ok(results) => {
                inner.stats.hits += 1;
                debug!(compressed, matches = results.len(), "Cache hit");
                CacheLookupResult::Hit {
                    results,
                    compressed,
                }
            }
            Err(e) => {
                warn!(error = %e, "Dropping undecodable cache entry");
                inner.remove(hash);
                inner.stats.corrupt += 1;
                inner.stats.misses += 1;
                CacheLookupResult::Corrupt
            }
        }
    }

    /// Stores `results` for a search (compressed if large) and returns the key digest.
    pub fn insert(
        &self,
        query: &str,
        filters: &SearchFilters,
        options: &SearchOptions,
        results: SearchResults,
    ) -> CacheResult<[u8; 32]> {
        let hash = hash_search(query, filters, options)?;
        let entry = CacheEntry::gated(
            results,
            self.config.compression_threshold,
            self.config.compression_level,
        )?;
        self.insert_by_hash(hash, entry);
        Ok(hash)
    }

    /// Stores a prepared entry under a precomputed key digest.
    pub fn insert_by_hash(&self, hash: [u8; 32], entry: CacheEntry) {
        let mut inner = self.inner.lock();

        if let Some(existing) = inner.entries.get_mut(&hash) {
            *existing = entry;
            return;
        }

        while inner.entries.len() >= self.config.max_entries {
            match inner.evict_oldest() {
                Some(evicted) => debug!(key = %key_hex(&evicted), "Evicted oldest cache entry"),
                None => break,
            }
        }

        debug!(
            key = %key_hex(&hash),
            compressed = entry.is_compressed(),
            "Cached search results"
        );
        inner.entries.insert(hash, entry);
        inner.order.push_back(hash);
    }

    /// Removes the entry for a search.
    pub fn remove(
        &self,
        query: &str,
        filters: &SearchFilters,
        options: &SearchOptions,
    ) -> CacheResult<Option<CacheEntry>> {
        let hash = hash_search(query, filters, options)?;
        Ok(self.remove_by_hash(&hash))
    }

    /// Removes an entry by key digest.
    pub fn remove_by_hash(&self, hash: &[u8; 32]) -> Option<CacheEntry> {
        self.inner.lock().remove(hash)
    }

    /// Returns `true` if an entry (expired or not) exists for the digest.
    pub fn contains_hash(&self, hash: &[u8; 32]) -> bool {
        self.inner.lock().entries.contains_key(hash)
    }

    /// Returns `true` if an entry exists for a search (expired or not).
    pub fn contains(
        &self,
        query: &str,
        filters: &SearchFilters,
        options: &SearchOptions,
    ) -> CacheResult<bool> {
        let hash = hash_search(query, filters, options)?;
        Ok(self.contains_hash(&hash))
    }

    /// Returns the number of entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Removes all entries. Counters are kept.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let mut inner = self.inner.lock();
        let ttl = self.config.ttl;
        let expired: Vec<[u8; 32]> = inner
            .order
            .iter()
            .filter(|h| inner.entries.get(*h).is_some_and(|e| e.is_expired(ttl)))
            .copied()
            .collect();
        for hash in &expired {
            inner.remove(hash);
        }
        inner.stats.expirations += expired.len() as u64;
        expired.len()
    }

    /// Key digests in insertion order (oldest first).
    pub fn hashes(&self) -> Vec<[u8; 32]> {
        self.inner.lock().order.iter().copied().collect()
    }

    /// Returns counters plus current entry counts.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            entries: inner.entries.len(),
            compressed_entries: inner.entries.values().filter(|e| e.is_compressed()).count(),
            ..inner.stats
        }
    }

    /// Zeroes the hit/miss/eviction counters.
    pub fn reset_stats(&self) {
        self.inner.lock().stats = CacheStats::default();
    }
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SearchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCache")
            .field("config", &self.config)
            .field("entries", &self.len())
            .finish()
    }
}

#[derive(Clone)]
/// Shared handle to a [`SearchCache`].
pub struct SearchCacheHandle {
    inner: Arc<SearchCache>,
}

impl SearchCacheHandle {
    /// Creates a new handle with the default config.
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SearchCache::new()),
        }
    }

    /// Creates a new handle with a validated config.
    pub fn with_config(config: CacheConfig) -> CacheResult<Self> {
        Ok(Self {
            inner: Arc::new(SearchCache::with_config(config)?),
        })
    }

    /// Returns the cache config.
    #[inline]
    pub fn config(&self) -> &CacheConfig {
        self.inner.config()
    }

    /// Looks up the results cached for a search.
    #[inline]
    pub fn lookup(
        &self,
        query: &str,
        filters: &SearchFilters,
        options: &SearchOptions,
    ) -> CacheResult<CacheLookupResult> {
        self.inner.lookup(query, filters, options)
    }

    /// Stores `results` for a search and returns the key digest.
    #[inline]
    pub fn insert(
        &self,
        query: &str,
        filters: &SearchFilters,
        options: &SearchOptions,
        results: SearchResults,
    ) -> CacheResult<[u8; 32]> {
        self.inner.insert(query, filters, options, results)
    }

    /// Returns `true` if an entry exists for a search.
    #[inline]
    pub fn contains(
        &self,
        query: &str,
        filters: &SearchFilters,
        options: &SearchOptions,
    ) -> CacheResult<bool> {
        self.inner.contains(query, filters, options)
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Removes every entry.
    #[inline]
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Removes expired entries, returning how many were dropped.
    #[inline]
    pub fn purge_expired(&self) -> usize {
        self.inner.purge_expired()
    }

    /// Returns counters plus current entry counts.
    #[inline]
    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }

    /// Returns the number of strong references to the underlying cache.
    #[inline]
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl Default for SearchCacheHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SearchCacheHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCacheHandle")
            .field("strong_count", &self.strong_count())
            .finish()
    }
}
