use serde::{Deserialize, Serialize};

use crate::search::SearchResults;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheStatus {
    Hit,
    HitCompressed,
    Expired,
    Corrupt,
    Miss,
}

impl CacheStatus {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::HitCompressed => "HIT_COMPRESSED",
            CacheStatus::Expired => "EXPIRED",
            CacheStatus::Corrupt => "CORRUPT",
            CacheStatus::Miss => "MISS",
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheStatus::Hit | CacheStatus::HitCompressed)
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookupResult {
    Hit {
        results: SearchResults,
        compressed: bool,
    },
    /// Entry existed but outlived the TTL; it has been removed.
    Expired,
    /// Compressed entry failed to decode; it has been removed.
    Corrupt,
    Miss,
}

impl CacheLookupResult {
    pub fn status(&self) -> CacheStatus {
        match self {
            CacheLookupResult::Hit {
                compressed: false, ..
            } => CacheStatus::Hit,
            CacheLookupResult::Hit {
                compressed: true, ..
            } => CacheStatus::HitCompressed,
            CacheLookupResult::Expired => CacheStatus::Expired,
            CacheLookupResult::Corrupt => CacheStatus::Corrupt,
            CacheLookupResult::Miss => CacheStatus::Miss,
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookupResult::Hit { .. })
    }

    pub fn results(&self) -> Option<&SearchResults> {
        match self {
            CacheLookupResult::Hit { results, .. } => Some(results),
            _ => None,
        }
    }

    pub fn into_results(self) -> Option<SearchResults> {
        match self {
            CacheLookupResult::Hit { results, .. } => Some(results),
            _ => None,
        }
    }
}

/// Counters since the cache was created (or last [`reset`](super::SearchCache::reset_stats)).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub corrupt: u64,
    pub entries: usize,
    pub compressed_entries: usize,
}

impl CacheStats {
    /// Fraction of lookups that hit; `0.0` before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            return 0.0;
        }
        self.hits as f64 / lookups as f64
    }
}
