use std::time::Duration;

use chrono::Utc;

use super::config::CacheConfig;
use super::entry::{CacheEntry, CachePayload};
use super::error::CacheError;
use super::search_cache::{SearchCache, SearchCacheHandle};
use super::types::{CacheLookupResult, CacheStatus};
use crate::compression::CompressedPayload;
use crate::hashing::hash_search;
use crate::search::{DocumentMatch, SearchFilters, SearchOptions, SearchResults};

fn results_for(query: &str, matches: usize) -> SearchResults {
    SearchResults {
        query: query.to_string(),
        matches: (0..matches)
            .map(|i| DocumentMatch {
                document_id: format!("doc-{i}"),
                document_name: format!("file-{i}.pdf"),
                score: 1.0,
                matched_terms: vec![query.to_string()],
                snippet: Some(format!("some context around **{query}** in document {i}")),
                content: None,
                uploaded_at: Utc::now(),
            })
            .collect(),
        total_count: matches,
        elapsed_ms: 3,
        filters: SearchFilters::default(),
        searched_at: Utc::now(),
    }
}

fn defaults() -> (SearchFilters, SearchOptions) {
    (SearchFilters::default(), SearchOptions::default())
}

#[test]
fn test_cache_status_values() {
    assert_eq!(CacheStatus::Hit.as_str(), "HIT");
    assert_eq!(CacheStatus::HitCompressed.to_string(), "HIT_COMPRESSED");
    assert!(CacheStatus::Hit.is_hit());
    assert!(CacheStatus::HitCompressed.is_hit());
    assert!(!CacheStatus::Expired.is_hit());
    assert!(!CacheStatus::Corrupt.is_hit());
    assert!(!CacheStatus::Miss.is_hit());
}

#[test]
fn test_new_cache_is_empty() {
    let cache = SearchCache::new();
    assert!(cache.is_empty());
    assert_eq!(cache.len(), 0);
    assert_eq!(cache.config().max_entries, 50);
}

#[test]
fn test_config_validation() {
    assert!(SearchCache::with_config(CacheConfig::default().max_entries(0)).is_err());
    assert!(SearchCache::with_config(CacheConfig::default().ttl(Duration::ZERO)).is_err());
    assert!(matches!(
        SearchCache::with_config(CacheConfig::default().compression_level(1000)),
        Err(CacheError::Config { .. })
    ));
    assert!(SearchCache::with_config(CacheConfig::default()).is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_insert_and_lookup_hit() {
    let cache = SearchCache::new();
    let (filters, options) = defaults();
    let results = results_for("invoice", 3);

    cache
        .insert("invoice", &filters, &options, results.clone())
        .unwrap();

    let lookup = cache.lookup("invoice", &filters, &options).unwrap();
    assert_eq!(lookup.status(), CacheStatus::Hit);
    assert_eq!(lookup.into_results(), Some(results));

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 0);
}

#[test]
fn test_lookup_miss() {
    let cache = SearchCache::new();
    let (filters, options) = defaults();

    let lookup = cache.lookup("nothing", &filters, &options).unwrap();
    assert_eq!(lookup, CacheLookupResult::Miss);
    assert!(!lookup.is_hit());
    assert_eq!(cache.stats().misses, 1);
}

#[tokio::test(start_paused = true)]
async fn test_different_filters_are_different_keys() {
    let cache = SearchCache::new();
    let options = SearchOptions::default();
    let filtered = SearchFilters::default().with_tag("finance");

    cache
        .insert("invoice", &filtered, &options, results_for("invoice", 1))
        .unwrap();

    assert!(cache.lookup("invoice", &filtered, &options).unwrap().is_hit());
    assert!(
        !cache
            .lookup("invoice", &SearchFilters::default(), &options)
            .unwrap()
            .is_hit()
    );
}

#[tokio::test(start_paused = true)]
async fn test_entry_expires_after_ttl() {
    let cache = SearchCache::new();
    let (filters, options) = defaults();
    cache
        .insert("invoice", &filters, &options, results_for("invoice", 1))
        .unwrap();

    tokio::time::advance(Duration::from_secs(299)).await;
    assert!(cache.lookup("invoice", &filters, &options).unwrap().is_hit());

    tokio::time::advance(Duration::from_secs(2)).await;
    let lookup = cache.lookup("invoice", &filters, &options).unwrap();
    assert_eq!(lookup, CacheLookupResult::Expired);
    assert!(cache.is_empty());
    assert!(cache.hashes().is_empty());

    let stats = cache.stats();
    assert_eq!(stats.expirations, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test(start_paused = true)]
async fn test_purge_expired() {
    let cache = SearchCache::with_config(CacheConfig::default().ttl(Duration::from_secs(10)))
        .unwrap();
    let (filters, options) = defaults();

    cache
        .insert("old", &filters, &options, results_for("old", 1))
        .unwrap();
    tokio::time::advance(Duration::from_secs(8)).await;
    cache
        .insert("new", &filters, &options, results_for("new", 1))
        .unwrap();
    tokio::time::advance(Duration::from_secs(5)).await;

    assert_eq!(cache.purge_expired(), 1);
    assert_eq!(cache.len(), 1);
    assert!(cache.contains("new", &filters, &options).unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_capacity_evicts_earliest_inserted() {
    let cache = SearchCache::new();
    let (filters, options) = defaults();

    for i in 0..50 {
        let query = format!("query-{i}");
        cache
            .insert(&query, &filters, &options, results_for(&query, 1))
            .unwrap();
    }
    assert_eq!(cache.len(), 50);

    // Reading an entry does not protect it: eviction is by insertion order.
    assert!(cache.lookup("query-0", &filters, &options).unwrap().is_hit());

    cache
        .insert("query-50", &filters, &options, results_for("query-50", 1))
        .unwrap();

    assert_eq!(cache.len(), 50);
    assert!(!cache.contains("query-0", &filters, &options).unwrap());
    assert!(cache.contains("query-1", &filters, &options).unwrap());
    assert!(cache.contains("query-50", &filters, &options).unwrap());
    assert_eq!(cache.stats().evictions, 1);

    let first = hash_search("query-1", &filters, &options).unwrap();
    assert_eq!(cache.hashes().first(), Some(&first));
}

#[tokio::test(start_paused = true)]
async fn test_cache_never_exceeds_capacity() {
    let cache = SearchCache::with_config(CacheConfig::default().max_entries(5)).unwrap();
    let (filters, options) = defaults();

    for i in 0..20 {
        let query = format!("q{i}");
        cache
            .insert(&query, &filters, &options, results_for(&query, 1))
            .unwrap();
        assert!(cache.len() <= 5);
    }
    assert_eq!(cache.stats().evictions, 15);
}

#[tokio::test(start_paused = true)]
async fn test_reinsert_existing_key_does_not_evict() {
    let cache = SearchCache::with_config(CacheConfig::default().max_entries(2)).unwrap();
    let (filters, options) = defaults();

    cache
        .insert("a", &filters, &options, results_for("a", 1))
        .unwrap();
    cache
        .insert("b", &filters, &options, results_for("b", 1))
        .unwrap();
    cache
        .insert("a", &filters, &options, results_for("a", 2))
        .unwrap();

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.stats().evictions, 0);

    let hit = cache.lookup("a", &filters, &options).unwrap();
    assert_eq!(hit.results().map(|r| r.len()), Some(2));

    // "a" kept its original slot, so it is still first out.
    cache
        .insert("c", &filters, &options, results_for("c", 1))
        .unwrap();
    assert!(!cache.contains("a", &filters, &options).unwrap());
    assert!(cache.contains("b", &filters, &options).unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_large_results_are_compressed() {
    let cache = SearchCache::new();
    let (filters, options) = defaults();
    let large = results_for("revenue", 300);
    let small = results_for("tiny", 1);

    cache
        .insert("revenue", &filters, &options, large.clone())
        .unwrap();
    cache
        .insert("tiny", &filters, &options, small.clone())
        .unwrap();

    let stats = cache.stats();
    assert_eq!(stats.entries, 2);
    assert_eq!(stats.compressed_entries, 1);

    let hit = cache.lookup("revenue", &filters, &options).unwrap();
    assert_eq!(hit.status(), CacheStatus::HitCompressed);
    assert_eq!(hit.into_results(), Some(large));

    let hit = cache.lookup("tiny", &filters, &options).unwrap();
    assert_eq!(hit.status(), CacheStatus::Hit);
    assert_eq!(hit.into_results(), Some(small));
}

#[tokio::test(start_paused = true)]
async fn test_threshold_is_inclusive() {
    let results = results_for("edge", 1);
    let len = serde_json::to_vec(&results).unwrap().len();

    let at = CacheEntry::gated(results.clone(), len, 3).unwrap();
    assert!(at.is_compressed());

    let above = CacheEntry::gated(results, len + 1, 3).unwrap();
    assert!(!above.is_compressed());
    assert!(matches!(above.payload(), CachePayload::Raw(_)));
}

#[tokio::test(start_paused = true)]
async fn test_non_finite_scores_are_never_stored() {
    let cache = SearchCache::new();
    let (filters, options) = defaults();

    for (query, size) in [("large", 300), ("small", 1)] {
        let mut results = results_for(query, size);
        results.matches[0].score = f32::NAN;

        let err = cache
            .insert(query, &filters, &options, results)
            .unwrap_err();
        assert!(matches!(err, CacheError::Compression(_)));
        assert_eq!(
            cache.lookup(query, &filters, &options).unwrap(),
            CacheLookupResult::Miss
        );
    }

    let stats = cache.stats();
    assert_eq!(stats.entries, 0);
    assert_eq!(stats.corrupt, 0);
}

#[tokio::test(start_paused = true)]
async fn test_corrupt_entry_is_removed_and_counts_as_miss() {
    let cache = SearchCache::new();
    let (filters, options) = defaults();
    let hash = hash_search("broken", &filters, &options).unwrap();

    cache.insert_by_hash(
        hash,
        CacheEntry::compressed(CompressedPayload::from_parts(vec![1, 2, 3, 4], 64)),
    );
    assert!(cache.contains_hash(&hash));

    let lookup = cache.lookup("broken", &filters, &options).unwrap();
    assert_eq!(lookup, CacheLookupResult::Corrupt);
    assert!(!cache.contains_hash(&hash));

    let stats = cache.stats();
    assert_eq!(stats.corrupt, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 0);
}

#[tokio::test(start_paused = true)]
async fn test_clear_and_remove() {
    let cache = SearchCache::new();
    let (filters, options) = defaults();

    for q in ["one", "two", "three"] {
        cache
            .insert(q, &filters, &options, results_for(q, 1))
            .unwrap();
    }

    assert!(cache.remove("two", &filters, &options).unwrap().is_some());
    assert!(cache.remove("two", &filters, &options).unwrap().is_none());
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.hashes().len(), 2);

    cache.clear();
    assert!(cache.is_empty());
    assert!(cache.hashes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stats_hit_rate_and_reset() {
    let cache = SearchCache::new();
    let (filters, options) = defaults();
    assert_eq!(cache.stats().hit_rate(), 0.0);

    cache
        .insert("a", &filters, &options, results_for("a", 1))
        .unwrap();
    cache.lookup("a", &filters, &options).unwrap();
    cache.lookup("a", &filters, &options).unwrap();
    cache.lookup("a", &filters, &options).unwrap();
    cache.lookup("b", &filters, &options).unwrap();

    assert!((cache.stats().hit_rate() - 0.75).abs() < f64::EPSILON);

    cache.reset_stats();
    let stats = cache.stats();
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.entries, 1);
}

#[tokio::test(start_paused = true)]
async fn test_handle_shares_cache() {
    let handle = SearchCacheHandle::new();
    let clone = handle.clone();
    assert_eq!(handle.strong_count(), 2);

    let (filters, options) = defaults();
    handle
        .insert("shared", &filters, &options, results_for("shared", 1))
        .unwrap();

    assert!(clone.lookup("shared", &filters, &options).unwrap().is_hit());
    assert_eq!(clone.len(), 1);

    clone.clear();
    assert!(handle.is_empty());
}

#[test]
fn test_handle_with_invalid_config() {
    assert!(SearchCacheHandle::with_config(CacheConfig::default().max_entries(0)).is_err());
}
