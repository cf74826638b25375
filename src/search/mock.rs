use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::document::ProcessedDocument;

use super::error::{SearchError, SearchResult};
use super::keyword::KeywordSearchService;
use super::service::SearchService;
use super::types::{SearchFilters, SearchOptions, SearchResults};

/// Counting [`SearchService`] for tests.
///
/// Delegates to [`KeywordSearchService`] unless canned results are set. Can be switched to fail
/// and can simulate latency.
#[derive(Debug, Clone, Default)]
pub struct MockSearchService {
    calls: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
    canned: Arc<Mutex<Option<SearchResults>>>,
    latency: Arc<Mutex<Option<Duration>>>,
    queries: Arc<Mutex<Vec<String>>>,
    inner: KeywordSearchService,
}

impl MockSearchService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always returns `results` (with the query rewritten to the requested one).
    pub fn with_results(results: SearchResults) -> Self {
        let mock = Self::default();
        *mock.canned.lock() = Some(results);
        mock
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Queries received, in call order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

impl SearchService for MockSearchService {
    async fn search(
        &self,
        documents: &[ProcessedDocument],
        query: &str,
        filters: &SearchFilters,
        options: &SearchOptions,
    ) -> SearchResult<SearchResults> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().push(query.to_string());

        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(SearchError::Service {
                reason: "mock search failure".to_string(),
            });
        }

        let canned = self.canned.lock().clone();
        match canned {
            Some(mut results) => {
                results.query = query.to_string();
                results.filters = filters.clone();
                Ok(results)
            }
            None => Ok(self.inner.rank(documents, query, filters, options)),
        }
    }
}
