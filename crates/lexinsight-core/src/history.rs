use std::collections::VecDeque;

use tracing::warn;

use crate::types::{CaseAnalysis, HistoryItem};

/// Maximum number of analyses kept; the oldest entry is evicted first.
pub const MAX_HISTORY_ITEMS: usize = 20;

/// Bounded, newest-first list of past analyses for one session.
///
/// Eviction is purely by insertion order. Nothing here is durable beyond
/// the owning session unless the caller saves `to_json()` somewhere.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    items: VecDeque<HistoryItem>,
    capacity: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_ITEMS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepend an analysis, evicting from the tail past capacity. Returns
    /// the stored entry.
    pub fn push(&mut self, analysis: CaseAnalysis) -> &HistoryItem {
        self.items.push_front(HistoryItem::from(analysis));
        self.items.truncate(self.capacity.max(1));
        &self.items[0]
    }

    /// Newest first.
    pub fn items(&self) -> impl Iterator<Item = &HistoryItem> {
        self.items.iter()
    }

    pub fn get(&self, id: &str) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn analysis_by_id(&self, id: &str) -> Option<&CaseAnalysis> {
        self.get(id).map(|item| &item.analysis)
    }

    pub fn latest(&self) -> Option<&HistoryItem> {
        self.items.front()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.items)
    }

    /// Restore from `to_json()` output. A corrupt snapshot yields an empty
    /// store rather than an error; an oversized one keeps the newest items.
    pub fn from_json(json: &str) -> Self {
        let mut store = Self::new();
        match serde_json::from_str::<Vec<HistoryItem>>(json) {
            Ok(items) => {
                store.items = items.into_iter().take(store.capacity).collect();
            }
            Err(e) => warn!(category = "analysis", "discarding unreadable history: {e}"),
        }
        store
    }
}
