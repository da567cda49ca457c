use std::collections::HashMap;

use crate::{
    error::SearchError,
    types::{Orientation, StockVideo},
};

/// Outcome of one query, success or terminal failure.
pub type SearchOutcome = std::result::Result<Vec<StockVideo>, SearchError>;

/// Memoized search outcomes for one run, keyed by `(query, orientation)`.
///
/// Failures are stored too, so a query that exhausted its retries is not sent again.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<(String, Orientation), SearchOutcome>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, query: &str, orientation: Orientation) -> Option<&SearchOutcome> {
        self.entries.get(&(query.to_string(), orientation))
    }

    pub fn insert(&mut self, query: &str, orientation: Orientation, outcome: SearchOutcome) {
        self.entries.insert((query.to_string(), orientation), outcome);
    }

    /// Number of distinct queries that reached the provider.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failures(&self) -> usize {
        self.entries.values().filter(|outcome| outcome.is_err()).count()
    }
}
