//! Cache-key construction.
//!
//! A key is the query, the JSON-encoded filters and the JSON-encoded options concatenated.
//! The cache stores the BLAKE3 digest of that string so every key has the same size.

use crate::search::{SearchFilters, SearchOptions};

/// Builds the raw cache key for a search.
pub fn cache_key(
    query: &str,
    filters: &SearchFilters,
    options: &SearchOptions,
) -> Result<String, serde_json::Error> {
    let filters_json = serde_json::to_string(filters)?;
    let options_json = serde_json::to_string(options)?;

    let mut key = String::with_capacity(query.len() + filters_json.len() + options_json.len());
    key.push_str(query);
    key.push_str(&filters_json);
    key.push_str(&options_json);
    Ok(key)
}

#[inline]
pub fn hash_cache_key(key: &str) -> [u8; 32] {
    *blake3::hash(key.as_bytes()).as_bytes()
}

/// [`cache_key`] followed by [`hash_cache_key`].
#[inline]
pub fn hash_search(
    query: &str,
    filters: &SearchFilters,
    options: &SearchOptions,
) -> Result<[u8; 32], serde_json::Error> {
    cache_key(query, filters, options).map(|key| hash_cache_key(&key))
}

/// Hex form of a key digest, for logs.
pub fn key_hex(hash: &[u8; 32]) -> String {
    blake3::Hash::from_bytes(*hash).to_hex().to_string()
}
