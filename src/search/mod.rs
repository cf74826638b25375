//! Search types, backends and the analytics collaborator.

pub mod error;
pub mod intelligence;
pub mod keyword;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod service;
pub mod types;


pub use error::{SearchError, SearchResult};
pub use intelligence::{
    MemorySearchIntelligence, SavedSearch, SearchAnalytics, SearchEvent, SearchIntelligence,
};
pub use keyword::{FieldWeights, KeywordSearchService};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockSearchService;
pub use service::SearchService;
pub use types::{DocumentMatch, SearchFilters, SearchOptions, SearchResults, SortOrder};
