//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `DOCSIFT_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::constants::{
    DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL_SECS, DEFAULT_COMPRESSION_LEVEL,
    DEFAULT_COMPRESSION_THRESHOLD_BYTES, DEFAULT_DEBOUNCE_MS, DEFAULT_DOCUMENT_TTL_SECS,
    DEFAULT_HISTORY_LIMIT, DEFAULT_MIN_QUERY_LEN,
};
use crate::searcher::SearcherConfig;

/// Runtime configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `DOCSIFT_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Lifetime of a cached result set. Default: 5 minutes.
    pub cache_ttl: Duration,

    /// Max cached result sets. Default: `50`.
    pub cache_max_entries: usize,

    /// Payload size (bytes) at which results are compressed. Default: `10240`.
    pub compression_threshold: usize,

    /// Debounce window for keystroke-driven searches. Default: 300ms.
    pub debounce: Duration,

    /// Minimum trimmed query length. Default: `2`.
    pub min_query_len: usize,

    /// JSON file backing the document store. Default: `./.data/documents.json`.
    pub store_path: PathBuf,

    /// Age after which untouched documents are cleaned up. Default: 30 days.
    pub document_ttl: Duration,
}

/// Default document store location used when `DOCSIFT_STORE_PATH` is not set.
pub const DEFAULT_STORE_PATH: &str = "./.data/documents.json";

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            compression_threshold: DEFAULT_COMPRESSION_THRESHOLD_BYTES,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            document_ttl: Duration::from_secs(DEFAULT_DOCUMENT_TTL_SECS),
        }
    }
}

impl Config {
    const ENV_CACHE_TTL_SECS: &'static str = "DOCSIFT_CACHE_TTL_SECS";
    const ENV_CACHE_MAX_ENTRIES: &'static str = "DOCSIFT_CACHE_MAX_ENTRIES";
    const ENV_COMPRESSION_THRESHOLD: &'static str = "DOCSIFT_COMPRESSION_THRESHOLD";
    const ENV_DEBOUNCE_MS: &'static str = "DOCSIFT_DEBOUNCE_MS";
    const ENV_MIN_QUERY_LEN: &'static str = "DOCSIFT_MIN_QUERY_LEN";
    const ENV_STORE_PATH: &'static str = "DOCSIFT_STORE_PATH";
    const ENV_DOCUMENT_TTL_SECS: &'static str = "DOCSIFT_DOCUMENT_TTL_SECS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let cache_ttl = Self::parse_u64_from_env(Self::ENV_CACHE_TTL_SECS)?
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);
        let cache_max_entries = Self::parse_u64_from_env(Self::ENV_CACHE_MAX_ENTRIES)?
            .map(|v| v as usize)
            .unwrap_or(defaults.cache_max_entries);
        let compression_threshold = Self::parse_u64_from_env(Self::ENV_COMPRESSION_THRESHOLD)?
            .map(|v| v as usize)
            .unwrap_or(defaults.compression_threshold);
        let debounce = Self::parse_u64_from_env(Self::ENV_DEBOUNCE_MS)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.debounce);
        let min_query_len = Self::parse_u64_from_env(Self::ENV_MIN_QUERY_LEN)?
            .map(|v| v as usize)
            .unwrap_or(defaults.min_query_len);
        let store_path = Self::parse_path_from_env(Self::ENV_STORE_PATH, defaults.store_path);
        let document_ttl = Self::parse_u64_from_env(Self::ENV_DOCUMENT_TTL_SECS)?
            .map(Duration::from_secs)
            .unwrap_or(defaults.document_ttl);

        Ok(Self {
            cache_ttl,
            cache_max_entries,
            compression_threshold,
            debounce,
            min_query_len,
            store_path,
            document_ttl,
        })
    }

    /// Validates basic invariants (does not create the store file).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl.is_zero() {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_CACHE_TTL_SECS,
            });
        }
        if self.cache_max_entries == 0 {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_CACHE_MAX_ENTRIES,
            });
        }
        if self.min_query_len == 0 {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_MIN_QUERY_LEN,
            });
        }
        if self.store_path.is_dir() {
            return Err(ConfigError::NotAFile {
                path: self.store_path.clone(),
            });
        }
        Ok(())
    }

    /// Cache settings derived from this config.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: self.cache_ttl,
            max_entries: self.cache_max_entries,
            compression_threshold: self.compression_threshold,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }

    /// Searcher settings derived from this config.
    pub fn searcher_config(&self) -> SearcherConfig {
        SearcherConfig {
            debounce: self.debounce,
            min_query_len: self.min_query_len,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    fn parse_u64_from_env(var_name: &'static str) -> Result<Option<u64>, ConfigError> {
        match env::var(var_name) {
            Ok(value) => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed
                    .parse()
                    .map(Some)
                    .map_err(|e| ConfigError::InvalidNumber {
                        name: var_name,
                        value: value.clone(),
                        source: e,
                    })
            }
            Err(_) => Ok(None),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    }
}
