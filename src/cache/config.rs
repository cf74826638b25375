use std::time::Duration;

use crate::constants::{
    DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL_SECS, DEFAULT_COMPRESSION_LEVEL,
    DEFAULT_COMPRESSION_THRESHOLD_BYTES,
};

use super::error::{CacheError, CacheResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub max_entries: usize,
    pub compression_threshold: usize,
    pub compression_level: i32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            compression_threshold: DEFAULT_COMPRESSION_THRESHOLD_BYTES,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl CacheConfig {
    /// Sets the entry lifetime.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the maximum number of entries.
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Sets the payload size (bytes) at which entries are compressed.
    pub fn compression_threshold(mut self, threshold: usize) -> Self {
        self.compression_threshold = threshold;
        self
    }

    /// Sets the zstd compression level.
    pub fn compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    /// Rejects a zero TTL or capacity and out-of-range compression levels.
    pub fn validate(&self) -> CacheResult<()> {
        if self.ttl.is_zero() {
            return Err(CacheError::Config {
                reason: "ttl must be > 0".to_string(),
            });
        }
        if self.max_entries == 0 {
            return Err(CacheError::Config {
                reason: "max_entries must be > 0".to_string(),
            });
        }
        let levels = zstd::compression_level_range();
        if !levels.contains(&self.compression_level) {
            return Err(CacheError::Config {
                reason: format!(
                    "compression_level {} outside {}..={}",
                    self.compression_level,
                    levels.start(),
                    levels.end()
                ),
            });
        }
        Ok(())
    }
}
