//! Local keyword-scoring search backend.
//!
//! Scores documents by term occurrences across weighted fields (name, tags, summary,
//! analysis, extracted text), applies filters, sorts and truncates to the requested page.

use std::cmp::Ordering;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, instrument};

use crate::constants::SNIPPET_CONTEXT_CHARS;
use crate::document::ProcessedDocument;

use super::error::SearchResult;
use super::service::SearchService;
use super::types::{DocumentMatch, SearchFilters, SearchOptions, SearchResults, SortOrder};

/// Per-field multipliers applied to term occurrences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldWeights {
    pub name: f32,
    pub tags: f32,
    pub summary: f32,
    pub analysis: f32,
    pub text: f32,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            name: 3.0,
            tags: 2.5,
            summary: 1.5,
            analysis: 1.5,
            text: 1.0,
        }
    }
}

/// [`SearchService`] that ranks documents in process.
#[derive(Debug, Clone, Default)]
pub struct KeywordSearchService {
    weights: FieldWeights,
}

impl KeywordSearchService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: FieldWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &FieldWeights {
        &self.weights
    }

    /// Synchronous core of [`SearchService::search`].
    #[instrument(skip(self, documents, filters, options), fields(documents = documents.len(), query_len = query.len()))]
    pub fn rank(
        &self,
        documents: &[ProcessedDocument],
        query: &str,
        filters: &SearchFilters,
        options: &SearchOptions,
    ) -> SearchResults {
        let started = Instant::now();
        let terms = dedup(tokenize(query));

        let mut matches: Vec<DocumentMatch> = if terms.is_empty() {
            Vec::new()
        } else {
            documents
                .iter()
                .filter(|doc| passes_filters(doc, filters))
                .filter_map(|doc| self.score_document(doc, &terms, options))
                .filter(|m| filters.min_score.is_none_or(|min| m.score >= min))
                .collect()
        };

        sort_matches(&mut matches, options.sort);

        let total_count = matches.len();
        if options.limit > 0 {
            matches.truncate(options.limit);
        }

        debug!(terms = terms.len(), total_count, "Keyword ranking complete");

        SearchResults {
            query: query.to_string(),
            matches,
            total_count,
            elapsed_ms: started.elapsed().as_millis() as u64,
            filters: filters.clone(),
            searched_at: Utc::now(),
        }
    }

    fn score_document(
        &self,
        doc: &ProcessedDocument,
        terms: &[String],
        options: &SearchOptions,
    ) -> Option<DocumentMatch> {
        let name_tokens = tokenize(&doc.file_name);
        let summary_tokens = doc.summary.as_deref().map(tokenize).unwrap_or_default();
        let analysis_tokens: Vec<String> = doc
            .analysis
            .iter()
            .flat_map(|a| a.key_points.iter().chain(a.topics.iter()))
            .flat_map(|s| tokenize(s))
            .collect();
        let text_tokens = doc
            .extracted_text
            .as_deref()
            .map(tokenize)
            .unwrap_or_default();

        let mut score = 0.0f32;
        let mut matched_terms = Vec::new();

        for term in terms {
            let fields = [
                (self.weights.name, count_matches(&name_tokens, term, options.fuzzy)),
                (self.weights.tags, count_matches(&doc.tags, term, options.fuzzy)),
                (self.weights.summary, count_matches(&summary_tokens, term, options.fuzzy)),
                (self.weights.analysis, count_matches(&analysis_tokens, term, options.fuzzy)),
                (self.weights.text, count_matches(&text_tokens, term, options.fuzzy)),
            ];

            let term_score: f32 = fields
                .iter()
                .filter(|(_, count)| *count > 0)
                .map(|(weight, count)| weight * (*count as f32).sqrt())
                .sum();

            if term_score > 0.0 {
                score += term_score;
                matched_terms.push(term.clone());
            }
        }

        if matched_terms.is_empty() {
            return None;
        }

        // Favor documents that cover more of the query.
        score *= matched_terms.len() as f32 / terms.len() as f32;

        let snippet = doc
            .extracted_text
            .as_deref()
            .and_then(|text| highlight_snippet(text, &matched_terms, options.fuzzy))
            .or_else(|| {
                doc.summary
                    .as_deref()
                    .and_then(|text| highlight_snippet(text, &matched_terms, options.fuzzy))
            });

        Some(DocumentMatch {
            document_id: doc.id.clone(),
            document_name: doc.file_name.clone(),
            score,
            matched_terms,
            snippet,
            content: if options.include_content {
                doc.extracted_text.clone()
            } else {
                None
            },
            uploaded_at: doc.uploaded_at,
        })
    }
}

impl SearchService for KeywordSearchService {
    async fn search(
        &self,
        documents: &[ProcessedDocument],
        query: &str,
        filters: &SearchFilters,
        options: &SearchOptions,
    ) -> SearchResult<SearchResults> {
        Ok(self.rank(documents, query, filters, options))
    }
}

fn passes_filters(doc: &ProcessedDocument, filters: &SearchFilters) -> bool {
    if !filters.document_types.is_empty() {
        let doc_type = doc.document_type();
        if !filters
            .document_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&doc_type))
        {
            return false;
        }
    }
    if !filters.tags.is_empty() && !filters.tags.iter().any(|t| doc.tags.contains(t)) {
        return false;
    }
    if !filters.statuses.is_empty() && !filters.statuses.contains(&doc.status) {
        return false;
    }
    if filters.date_from.is_some_and(|from| doc.uploaded_at < from) {
        return false;
    }
    if filters.date_to.is_some_and(|to| doc.uploaded_at > to) {
        return false;
    }
    true
}

fn sort_matches(matches: &mut [DocumentMatch], sort: SortOrder) {
    match sort {
        SortOrder::Relevance => matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.uploaded_at.cmp(&a.uploaded_at))
                .then_with(|| a.document_name.cmp(&b.document_name))
        }),
        SortOrder::Newest => matches.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at)),
        SortOrder::Oldest => matches.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at)),
        SortOrder::Name => matches.sort_by(|a, b| {
            a.document_name
                .to_lowercase()
                .cmp(&b.document_name.to_lowercase())
        }),
    }
}

/// Byte ranges of alphanumeric runs in `text`.
fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        if c.is_alphanumeric() {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start.take() {
            spans.push((s, i));
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}

/// Lowercased alphanumeric words of `text`.
pub fn tokenize(text: &str) -> Vec<String> {
    word_spans(text)
        .into_iter()
        .map(|(s, e)| text[s..e].to_lowercase())
        .collect()
}

fn dedup(tokens: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(tokens.len());
    for token in tokens {
        if !seen.contains(&token) {
            seen.push(token);
        }
    }
    seen
}

fn term_matches(token: &str, term: &str, fuzzy: bool) -> bool {
    if token == term {
        return true;
    }
    if !fuzzy {
        return false;
    }
    let (token_len, term_len) = (token.chars().count(), term.chars().count());
    if term_len >= 3 && token.starts_with(term) {
        return true;
    }
    term_len >= 4 && token_len.abs_diff(term_len) <= 1 && edit_distance(token, term) <= 1
}

fn count_matches(tokens: &[String], term: &str, fuzzy: bool) -> usize {
    tokens
        .iter()
        .filter(|t| term_matches(t, term, fuzzy))
        .count()
}

/// Levenshtein distance over chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Returns a window of `text` around the first matched term, with the term wrapped in `**`.
pub fn highlight_snippet(text: &str, terms: &[String], fuzzy: bool) -> Option<String> {
    let (start, end) = word_spans(text).into_iter().find(|&(s, e)| {
        let word = text[s..e].to_lowercase();
        terms.iter().any(|t| term_matches(&word, t, fuzzy))
    })?;

    let window_start = text[..start]
        .char_indices()
        .rev()
        .nth(SNIPPET_CONTEXT_CHARS.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let window_end = text[end..]
        .char_indices()
        .nth(SNIPPET_CONTEXT_CHARS)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    let mut snippet = String::new();
    if window_start > 0 {
        snippet.push('…');
    }
    snippet.push_str(&text[window_start..start]);
    snippet.push_str("**");
    snippet.push_str(&text[start..end]);
    snippet.push_str("**");
    snippet.push_str(&text[end..window_end]);
    if window_end < text.len() {
        snippet.push('…');
    }
    Some(snippet)
}
