use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SEARCH_LIMIT;
use crate::document::ProcessingStatus;

/// Narrows a search. Empty fields do not constrain anything.
///
/// Serialization is part of the cache key, so field order is fixed and empty fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub document_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<ProcessingStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f32>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.document_types.is_empty()
            && self.tags.is_empty()
            && self.statuses.is_empty()
            && self.date_from.is_none()
            && self.date_to.is_none()
            && self.min_score.is_none()
    }

    pub fn with_document_type(mut self, document_type: &str) -> Self {
        self.document_types.push(document_type.to_lowercase());
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.trim().to_lowercase());
        self
    }

    pub fn with_status(mut self, status: ProcessingStatus) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn with_date_range(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Relevance,
    Newest,
    Oldest,
    Name,
}

/// How results are shaped (page size, matching mode, ordering).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub limit: usize,
    pub fuzzy: bool,
    pub include_content: bool,
    pub sort: SortOrder,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
            fuzzy: false,
            include_content: false,
            sort: SortOrder::Relevance,
        }
    }
}

impl SearchOptions {
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    pub fn include_content(mut self, include: bool) -> Self {
        self.include_content = include;
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }
}

/// One scored document in a result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMatch {
    pub document_id: String,
    pub document_name: String,
    pub score: f32,
    pub matched_terms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Ranked matches for a query, as returned by a [`super::SearchService`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub matches: Vec<DocumentMatch>,
    /// Matches before the `limit` was applied.
    pub total_count: usize,
    pub elapsed_ms: u64,
    pub filters: SearchFilters,
    pub searched_at: DateTime<Utc>,
}

impl SearchResults {
    pub fn empty(query: impl Into<String>, filters: SearchFilters) -> Self {
        Self {
            query: query.into(),
            matches: Vec::new(),
            total_count: 0,
            elapsed_ms: 0,
            filters,
            searched_at: Utc::now(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn best_match(&self) -> Option<&DocumentMatch> {
        self.matches.first()
    }
}
