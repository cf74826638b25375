//! Saved searches and search analytics.
//!
//! [`SearchIntelligence`] is the external collaborator the searcher reports to. Failures there
//! never fail a search; the searcher logs them and moves on.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{SearchError, SearchResult};
use super::types::SearchFilters;

/// One executed search, as reported for analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEvent {
    pub query: String,
    pub result_count: usize,
    pub elapsed_ms: u64,
    pub cached: bool,
    pub at: DateTime<Utc>,
}

/// A named query + filters the user can re-run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSearch {
    pub id: String,
    pub name: String,
    pub query: String,
    pub filters: SearchFilters,
    pub created_at: DateTime<Utc>,
    pub use_count: u64,
}

/// Aggregates over recorded [`SearchEvent`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchAnalytics {
    pub total_searches: u64,
    pub cached_searches: u64,
    pub zero_result_searches: u64,
    pub average_elapsed_ms: f64,
    /// Most frequent normalized queries, most frequent first.
    pub top_queries: Vec<(String, u64)>,
}

#[async_trait]
/// Saved-search storage and analytics recording.
pub trait SearchIntelligence: Send + Sync {
    /// Records an executed search.
    async fn record_search(&self, event: SearchEvent) -> SearchResult<()>;
    /// Saves `query` + `filters` under `name`.
    async fn save_search(
        &self,
        name: &str,
        query: &str,
        filters: &SearchFilters,
    ) -> SearchResult<SavedSearch>;
    /// Returns saved searches, newest first.
    async fn saved_searches(&self) -> SearchResult<Vec<SavedSearch>>;
    /// Looks up a saved search and bumps its use count.
    async fn use_saved_search(&self, id: &str) -> SearchResult<SavedSearch>;
    /// Deletes a saved search. Returns `false` if it did not exist.
    async fn delete_saved_search(&self, id: &str) -> SearchResult<bool>;
    /// Returns aggregates over recorded searches.
    async fn analytics(&self) -> SearchResult<SearchAnalytics>;
}

#[derive(Debug, Default)]
struct IntelligenceState {
    saved: HashMap<String, SavedSearch>,
    events: Vec<SearchEvent>,
}

/// In-process [`SearchIntelligence`].
#[derive(Debug)]
pub struct MemorySearchIntelligence {
    state: Mutex<IntelligenceState>,
    top_queries: usize,
}

impl Default for MemorySearchIntelligence {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySearchIntelligence {
    const DEFAULT_TOP_QUERIES: usize = 10;

    pub fn new() -> Self {
        Self {
            state: Mutex::new(IntelligenceState::default()),
            top_queries: Self::DEFAULT_TOP_QUERIES,
        }
    }

    pub fn event_count(&self) -> usize {
        self.state.lock().events.len()
    }

    pub fn events(&self) -> Vec<SearchEvent> {
        self.state.lock().events.clone()
    }
}

#[async_trait]
impl SearchIntelligence for MemorySearchIntelligence {
    async fn record_search(&self, event: SearchEvent) -> SearchResult<()> {
        self.state.lock().events.push(event);
        Ok(())
    }

    async fn save_search(
        &self,
        name: &str,
        query: &str,
        filters: &SearchFilters,
    ) -> SearchResult<SavedSearch> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SearchError::Intelligence {
                reason: "saved search name must not be empty".to_string(),
            });
        }
        let saved = SavedSearch {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            query: query.trim().to_string(),
            filters: filters.clone(),
            created_at: Utc::now(),
            use_count: 0,
        };
        self.state
            .lock()
            .saved
            .insert(saved.id.clone(), saved.clone());
        Ok(saved)
    }

    async fn saved_searches(&self) -> SearchResult<Vec<SavedSearch>> {
        let mut saved: Vec<_> = self.state.lock().saved.values().cloned().collect();
        saved.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(saved)
    }

    async fn use_saved_search(&self, id: &str) -> SearchResult<SavedSearch> {
        let mut state = self.state.lock();
        let saved = state
            .saved
            .get_mut(id)
            .ok_or_else(|| SearchError::SavedSearchNotFound { id: id.to_string() })?;
        saved.use_count += 1;
        Ok(saved.clone())
    }

    async fn delete_saved_search(&self, id: &str) -> SearchResult<bool> {
        Ok(self.state.lock().saved.remove(id).is_some())
    }

    async fn analytics(&self) -> SearchResult<SearchAnalytics> {
        let state = self.state.lock();
        let total = state.events.len() as u64;
        if total == 0 {
            return Ok(SearchAnalytics::default());
        }

        let mut counts: HashMap<String, u64> = HashMap::new();
        for event in &state.events {
            *counts.entry(event.query.trim().to_lowercase()).or_default() += 1;
        }
        let mut top_queries: Vec<(String, u64)> = counts.into_iter().collect();
        top_queries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_queries.truncate(self.top_queries);

        let elapsed_sum: u64 = state.events.iter().map(|e| e.elapsed_ms).sum();

        Ok(SearchAnalytics {
            total_searches: total,
            cached_searches: state.events.iter().filter(|e| e.cached).count() as u64,
            zero_result_searches: state.events.iter().filter(|e| e.result_count == 0).count()
                as u64,
            average_elapsed_ms: elapsed_sum as f64 / total as f64,
            top_queries,
        })
    }
}
