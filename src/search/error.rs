use thiserror::Error;

use crate::cache::CacheError;

#[derive(Debug, Error)]
/// Errors returned by search services and the searcher.
pub enum SearchError {
    /// The search backend failed.
    #[error("search service failed: {reason}")]
    Service {
        /// Error message.
        reason: String,
    },

    /// Analytics or saved-search backend failed.
    #[error("search intelligence failed: {reason}")]
    Intelligence {
        /// Error message.
        reason: String,
    },

    /// No saved search with this id.
    #[error("saved search not found: {id}")]
    SavedSearchNotFound { id: String },

    /// Result cache error (key encoding or compression).
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Convenience result type for search operations.
pub type SearchResult<T> = Result<T, SearchError>;
