use std::collections::{HashMap, HashSet};

use crate::page::ItemId;

/// Settled display state of a processed item. Items absent from the ledger are
/// unscanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Hidden,
    VisibleBadged,
    VisiblePlain,
}

/// Per-item processed markers, keyed by the item's stable id.
#[derive(Debug, Default)]
pub struct ItemLedger {
    entries: HashMap<ItemId, ItemState>,
}

impl ItemLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_processed(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn state(&self, id: &str) -> Option<ItemState> {
        self.entries.get(id).copied()
    }

    pub fn mark(&mut self, id: ItemId, state: ItemState) {
        self.entries.insert(id, state);
    }

    /// Drops every marker so the next pass reclassifies everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Forgets items that have left the page.
    pub fn retain_present(&mut self, present: &HashSet<&str>) {
        self.entries.retain(|id, _| present.contains(id.as_str()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_clear() {
        let mut ledger = ItemLedger::new();
        ledger.mark("a".into(), ItemState::Hidden);
        ledger.mark("b".into(), ItemState::VisibleBadged);

        assert!(ledger.is_processed("a"));
        assert_eq!(ledger.state("b"), Some(ItemState::VisibleBadged));
        assert!(!ledger.is_processed("c"));

        ledger.clear();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_retain_present() {
        let mut ledger = ItemLedger::new();
        ledger.mark("a".into(), ItemState::VisiblePlain);
        ledger.mark("b".into(), ItemState::VisiblePlain);

        let present: HashSet<&str> = ["b"].into_iter().collect();
        ledger.retain_present(&present);

        assert_eq!(ledger.len(), 1);
        assert!(ledger.is_processed("b"));
    }
}
