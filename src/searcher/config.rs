use std::time::Duration;

use crate::constants::{DEFAULT_DEBOUNCE_MS, DEFAULT_HISTORY_LIMIT, DEFAULT_MIN_QUERY_LEN};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearcherConfig {
    pub debounce: Duration,
    pub min_query_len: usize,
    pub history_limit: usize,
}

impl Default for SearcherConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl SearcherConfig {
    /// Sets the debounce window.
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Sets the minimum trimmed query length.
    pub fn min_query_len(mut self, len: usize) -> Self {
        self.min_query_len = len;
        self
    }

    /// Sets how many recent queries are remembered.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }
}
