use crate::document::ProcessedDocument;

use super::error::SearchResult;
use super::types::{SearchFilters, SearchOptions, SearchResults};

/// External document-search backend.
///
/// Given the current document set, a query and its filters/options, returns ranked results.
pub trait SearchService: Send + Sync {
    fn search(
        &self,
        documents: &[ProcessedDocument],
        query: &str,
        filters: &SearchFilters,
        options: &SearchOptions,
    ) -> impl std::future::Future<Output = SearchResult<SearchResults>> + Send;
}
