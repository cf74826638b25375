use crate::cache::CacheStatus;
use crate::search::SearchResults;

/// What observers render: the current query and the outcome of the latest search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub results: Option<SearchResults>,
    pub is_searching: bool,
    /// User-facing message from the last failed search.
    pub error: Option<String>,
    /// Cache outcome of the last executed search.
    pub last_status: Option<CacheStatus>,
}

impl SearchState {
    pub fn result_count(&self) -> usize {
        self.results.as_ref().map_or(0, |r| r.len())
    }

    pub fn has_results(&self) -> bool {
        self.result_count() > 0
    }
}
