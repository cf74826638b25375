//! Search executor: debounce → cache lookup → search service → cache store → observers.
//!
//! [`DocumentSearcher`] owns the current filters/options, a [`Debouncer`] for keystroke-driven
//! input and a `watch` channel of [`SearchState`] that observers render from.

pub mod config;
pub mod state;


pub use config::SearcherConfig;
pub use state::SearchState;

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::cache::{CacheStatus, SearchCacheHandle};
use crate::debounce::Debouncer;
use crate::document::DocumentStore;
use crate::search::{
    SavedSearch, SearchAnalytics, SearchError, SearchEvent, SearchFilters, SearchIntelligence,
    SearchOptions, SearchResult, SearchResults, SearchService,
};

struct SearcherShared<S: SearchService> {
    service: S,
    store: Arc<dyn DocumentStore>,
    cache: SearchCacheHandle,
    intelligence: RwLock<Option<Arc<dyn SearchIntelligence>>>,
    config: SearcherConfig,
    filters: RwLock<SearchFilters>,
    options: RwLock<SearchOptions>,
    history: Mutex<VecDeque<String>>,
    /// Bumped by every search and by `clear`; stale completions do not publish.
    generation: AtomicU64,
    state: watch::Sender<SearchState>,
}

impl<S: SearchService> SearcherShared<S> {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    fn reset_results(&self, query: String) {
        self.state.send_modify(|s| {
            s.query = query;
            s.results = None;
            s.is_searching = false;
            s.error = None;
            s.last_status = None;
        });
    }

    fn publish(&self, generation: u64, query: &str, results: &SearchResults, status: CacheStatus) {
        if !self.is_current(generation) {
            debug!(generation, "Dropping stale search results");
            return;
        }
        self.state.send_modify(|s| {
            s.query = query.to_string();
            s.results = Some(results.clone());
            s.is_searching = false;
            s.error = None;
            s.last_status = Some(status);
        });
    }

    fn remember(&self, query: &str) {
        let limit = self.config.history_limit;
        if limit == 0 {
            return;
        }
        let mut history = self.history.lock();
        history.retain(|q| q != query);
        history.push_front(query.to_string());
        history.truncate(limit);
    }

    async fn record(&self, query: &str, results: &SearchResults, elapsed_ms: u64, cached: bool) {
        let intelligence = self.intelligence.read().clone();
        let Some(intelligence) = intelligence else {
            return;
        };
        let event = SearchEvent {
            query: query.to_string(),
            result_count: results.total_count,
            elapsed_ms,
            cached,
            at: Utc::now(),
        };
        if let Err(e) = intelligence.record_search(event).await {
            warn!(error = %e, "Failed to record search analytics");
        }
    }

    /// Claims a new generation; earlier searches stop publishing.
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    async fn execute(
        &self,
        raw_query: &str,
        filters: SearchFilters,
        options: SearchOptions,
    ) -> SearchResult<Option<SearchResults>> {
        let generation = self.next_generation();
        self.execute_as(generation, raw_query, filters, options).await
    }

    /// Runs a search that publishes only while `generation` is still current.
    #[instrument(skip(self, raw_query, filters, options), fields(query_len = raw_query.len()))]
    async fn execute_as(
        &self,
        generation: u64,
        raw_query: &str,
        filters: SearchFilters,
        options: SearchOptions,
    ) -> SearchResult<Option<SearchResults>> {
        let query = raw_query.trim().to_string();

        if query.chars().count() < self.config.min_query_len {
            debug!(min = self.config.min_query_len, "Query too short, clearing results");
            if self.is_current(generation) {
                self.reset_results(query);
            }
            return Ok(None);
        }

        let started = Instant::now();
        let lookup = match self.cache.lookup(&query, &filters, &options) {
            Ok(lookup) => lookup,
            Err(e) => {
                let e = SearchError::from(e);
                self.fail(generation, &query, &e);
                return Err(e);
            }
        };
        let status = lookup.status();
        if let Some(results) = lookup.into_results() {
            info!(%status, matches = results.len(), "Serving search from cache");
            self.remember(&query);
            self.publish(generation, &query, &results, status);
            self.record(&query, &results, started.elapsed().as_millis() as u64, true)
                .await;
            return Ok(Some(results));
        }

        debug!(%status, "Cache miss, querying search service");
        if self.is_current(generation) {
            self.state.send_modify(|s| {
                s.query = query.clone();
                s.is_searching = true;
                s.error = None;
            });
        }

        let documents = self.store.list();
        let outcome = self
            .service
            .search(&documents, &query, &filters, &options)
            .await;

        match outcome {
            Ok(results) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                info!(
                    matches = results.len(),
                    total = results.total_count,
                    elapsed_ms,
                    "Search executed"
                );
                if let Err(e) = self
                    .cache
                    .insert(&query, &filters, &options, results.clone())
                {
                    warn!(error = %e, "Failed to cache search results");
                }
                self.remember(&query);
                self.publish(generation, &query, &results, status);
                self.record(&query, &results, elapsed_ms, false).await;
                Ok(Some(results))
            }
            Err(e) => {
                warn!(error = %e, "Search failed");
                self.fail(generation, &query, &e);
                Err(e)
            }
        }
    }

    fn fail(&self, generation: u64, query: &str, error: &SearchError) {
        if !self.is_current(generation) {
            return;
        }
        self.state.send_modify(|s| {
            s.query = query.to_string();
            s.is_searching = false;
            s.error = Some(error.to_string());
        });
    }
}

/// Debounced, cached document search with observable state.
pub struct DocumentSearcher<S: SearchService + 'static> {
    shared: Arc<SearcherShared<S>>,
    debouncer: Debouncer,
}

impl<S: SearchService + 'static> DocumentSearcher<S> {
    /// Creates a searcher with empty filters, default options and no intelligence.
    pub fn new(
        service: S,
        store: Arc<dyn DocumentStore>,
        cache: SearchCacheHandle,
        config: SearcherConfig,
    ) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        let debouncer = Debouncer::new(config.debounce);
        Self {
            shared: Arc::new(SearcherShared {
                service,
                store,
                cache,
                intelligence: RwLock::new(None),
                config,
                filters: RwLock::new(SearchFilters::default()),
                options: RwLock::new(SearchOptions::default()),
                history: Mutex::new(VecDeque::new()),
                generation: AtomicU64::new(0),
                state,
            }),
            debouncer,
        }
    }

    /// Attaches an analytics / saved-search collaborator.
    pub fn with_intelligence(self, intelligence: Arc<dyn SearchIntelligence>) -> Self {
        self.set_intelligence(intelligence);
        self
    }

    /// Replaces the analytics / saved-search collaborator.
    pub fn set_intelligence(&self, intelligence: Arc<dyn SearchIntelligence>) {
        *self.shared.intelligence.write() = Some(intelligence);
    }

    /// Returns the searcher config.
    pub fn config(&self) -> &SearcherConfig {
        &self.shared.config
    }

    /// Returns the shared result cache.
    pub fn cache(&self) -> &SearchCacheHandle {
        &self.shared.cache
    }

    /// Returns the search backend.
    pub fn service(&self) -> &S {
        &self.shared.service
    }

    /// Runs `query` now with the current filters and options.
    pub async fn search(&self, query: &str) -> SearchResult<Option<SearchResults>> {
        let filters = self.filters();
        let options = self.options();
        self.shared.execute(query, filters, options).await
    }

    /// Runs `query` now with explicit filters and options (stored ones are left untouched).
    pub async fn search_with(
        &self,
        query: &str,
        filters: SearchFilters,
        options: SearchOptions,
    ) -> SearchResult<Option<SearchResults>> {
        self.shared.execute(query, filters, options).await
    }

    /// Keystroke entry point: records `query` and schedules a search after the debounce window.
    ///
    /// Queries below the minimum length cancel any pending search and clear results instead.
    /// Must be called from within a tokio runtime.
    pub fn search_debounced(&self, query: impl Into<String>) {
        let query = query.into();
        let too_short = query.trim().chars().count() < self.shared.config.min_query_len;

        // Claimed now so a later `clear` or input invalidates this search even if its timer
        // has already fired.
        let generation = self.shared.next_generation();

        if too_short {
            self.debouncer.cancel();
            self.shared.reset_results(query);
            return;
        }

        self.shared.state.send_modify(|s| s.query = query.clone());

        let shared = Arc::clone(&self.shared);
        self.debouncer.schedule(async move {
            if !shared.is_current(generation) {
                debug!(generation, "Debounced search superseded before it started");
                return;
            }
            let filters = shared.filters.read().clone();
            let options = shared.options.read().clone();
            if let Err(e) = shared.execute_as(generation, &query, filters, options).await {
                debug!(error = %e, "Debounced search failed");
            }
        });
    }

    /// Re-schedules the current query (e.g. after changing filters).
    pub fn refresh(&self) {
        let query = self.shared.state.borrow().query.clone();
        self.search_debounced(query);
    }

    /// Returns `true` while a debounced search is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Cancels pending work and resets the query and results.
    pub fn clear(&self) {
        self.debouncer.cancel();
        self.shared.next_generation();
        self.shared.reset_results(String::new());
    }

    /// Returns the current filters.
    pub fn filters(&self) -> SearchFilters {
        self.shared.filters.read().clone()
    }

    /// Replaces the filters used by subsequent searches.
    pub fn set_filters(&self, filters: SearchFilters) {
        *self.shared.filters.write() = filters;
    }

    /// Resets filters to empty.
    pub fn clear_filters(&self) {
        *self.shared.filters.write() = SearchFilters::default();
    }

    /// Returns the current options.
    pub fn options(&self) -> SearchOptions {
        self.shared.options.read().clone()
    }

    /// Replaces the options used by subsequent searches.
    pub fn set_options(&self, options: SearchOptions) {
        *self.shared.options.write() = options;
    }

    /// Snapshot of the observable state.
    pub fn state(&self) -> SearchState {
        self.shared.state.borrow().clone()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.shared.state.subscribe()
    }

    /// Distinct recent queries, newest first.
    pub fn history(&self) -> Vec<String> {
        self.shared.history.lock().iter().cloned().collect()
    }

    /// Forgets all recent queries.
    pub fn clear_history(&self) {
        self.shared.history.lock().clear();
    }

    /// Drops cached results; call after documents are added, changed or removed.
    pub fn documents_changed(&self) {
        debug!(entries = self.shared.cache.len(), "Invalidating search cache");
        self.shared.cache.clear();
    }

    fn intelligence(&self) -> SearchResult<Arc<dyn SearchIntelligence>> {
        self.shared
            .intelligence
            .read()
            .clone()
            .ok_or_else(|| SearchError::Intelligence {
                reason: "no search intelligence configured".to_string(),
            })
    }

    /// Saves the current query and filters under `name`.
    pub async fn save_search(&self, name: &str) -> SearchResult<SavedSearch> {
        let intelligence = self.intelligence()?;
        let query = self.shared.state.borrow().query.clone();
        let filters = self.filters();
        intelligence.save_search(name, &query, &filters).await
    }

    /// Lists saved searches, newest first.
    pub async fn saved_searches(&self) -> SearchResult<Vec<SavedSearch>> {
        self.intelligence()?.saved_searches().await
    }

    /// Loads a saved search's filters and runs its query immediately.
    pub async fn run_saved_search(&self, id: &str) -> SearchResult<Option<SearchResults>> {
        let saved = self.intelligence()?.use_saved_search(id).await?;
        self.debouncer.cancel();
        self.set_filters(saved.filters.clone());
        let options = self.options();
        self.shared.execute(&saved.query, saved.filters, options).await
    }

    /// Deletes a saved search. Returns `false` if it did not exist.
    pub async fn delete_saved_search(&self, id: &str) -> SearchResult<bool> {
        self.intelligence()?.delete_saved_search(id).await
    }

    /// Returns aggregated search analytics.
    pub async fn analytics(&self) -> SearchResult<SearchAnalytics> {
        self.intelligence()?.analytics().await
    }
}

impl<S: SearchService + 'static> std::fmt::Debug for DocumentSearcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSearcher")
            .field("config", &self.shared.config)
            .field("cache", &self.shared.cache)
            .field("debouncer", &self.debouncer)
            .finish_non_exhaustive()
    }
}
