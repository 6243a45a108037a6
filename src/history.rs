//! Recent-search log, most recent first.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub query: String,
    pub searched_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SearchHistory {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl SearchHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit + 1),
            limit,
        }
    }

    /// Put `query` at the front. Repeating a query moves it to the front
    /// instead of adding a duplicate; the oldest entry falls off past the
    /// limit.
    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        self.entries.retain(|e| e.query != query);
        self.entries.push_front(HistoryEntry {
            query: query.to_string(),
            searched_at: Utc::now(),
        });
        self.entries.truncate(self.limit);
    }

    pub fn queries(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.query.clone()).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
