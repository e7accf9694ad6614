use std::sync::{Arc, Mutex, MutexGuard};

use super::{node_id, parse_snapshot, ContentItem, DashboardSummary, HostPage};

#[derive(Debug, Clone)]
struct CardNode {
    item: ContentItem,
    hidden: bool,
    badged: bool,
}

#[derive(Debug, Clone, Default)]
struct OverlayNode {
    visible: bool,
    summary: Option<DashboardSummary>,
}

#[derive(Debug, Default)]
struct PageState {
    path: String,
    cards: Vec<CardNode>,
    heading: Option<String>,
    feed_suppressed: bool,
    overlay: Option<OverlayNode>,
    overlay_creations: usize,
    mutations: usize,
}

impl PageState {
    fn card(&self, id: &str) -> Option<&CardNode> {
        self.cards.iter().find(|card| card.item.id == id)
    }

    fn card_mut(&mut self, id: &str) -> Option<&mut CardNode> {
        self.cards.iter_mut().find(|card| card.item.id == id)
    }

    /// Appends a card, giving it a node id no other card on the page holds.
    fn push_card(&mut self, mut item: ContentItem) -> String {
        let mut occurrence = 0;
        let mut id = node_id(&item.video_id, occurrence);
        while self.card(&id).is_some() {
            occurrence += 1;
            id = node_id(&item.video_id, occurrence);
        }
        item.id = id.clone();
        self.cards.push(CardNode {
            item,
            hidden: false,
            badged: false,
        });
        id
    }
}

/// In-memory document standing in for the host DOM.
///
/// Clones share the same document, so a host (or test) can keep a handle while
/// the content script owns another. Every mutating [`HostPage`] call is counted,
/// whether or not it changed anything.
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    state: Arc<Mutex<PageState>>,
}

impl MemoryPage {
    pub fn new(path: impl Into<String>) -> Self {
        let page = Self::default();
        page.lock().path = path.into();
        page
    }

    /// Builds a page from a rendered HTML snapshot served at `path`.
    pub fn from_html(path: impl Into<String>, html: &str) -> Self {
        let snapshot = parse_snapshot(html);
        let page = Self::new(path);
        {
            let mut state = page.lock();
            state.heading = snapshot.heading;
            for item in snapshot.items {
                state.push_card(item);
            }
        }
        page
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // Host-side operations. These simulate the page changing on its own and are
    // not counted as mutations by the content script.

    /// Appends a card and returns its node id. A card repeating a video already
    /// on the page gets a fresh id rather than sharing the existing one.
    pub fn insert_item(&self, item: ContentItem) -> String {
        self.lock().push_card(item)
    }

    pub fn remove_item(&self, id: &str) {
        self.lock().cards.retain(|card| card.item.id != id);
    }

    /// Replaces the whole card set, as a single-page navigation does.
    pub fn replace_items(&self, items: Vec<ContentItem>) {
        let mut state = self.lock();
        state.cards.clear();
        for item in items {
            state.push_card(item);
        }
    }

    pub fn set_path(&self, path: impl Into<String>) {
        self.lock().path = path.into();
    }

    pub fn set_heading(&self, heading: Option<&str>) {
        self.lock().heading = heading.map(str::to_string);
    }

    // Inspection.

    pub fn hidden(&self, id: &str) -> bool {
        self.lock().card(id).map(|card| card.hidden).unwrap_or(false)
    }

    pub fn badged(&self, id: &str) -> bool {
        self.lock().card(id).map(|card| card.badged).unwrap_or(false)
    }

    pub fn hidden_ids(&self) -> Vec<String> {
        self.lock()
            .cards
            .iter()
            .filter(|card| card.hidden)
            .map(|card| card.item.id.clone())
            .collect()
    }

    pub fn badged_ids(&self) -> Vec<String> {
        self.lock()
            .cards
            .iter()
            .filter(|card| card.badged)
            .map(|card| card.item.id.clone())
            .collect()
    }

    pub fn feed_suppressed(&self) -> bool {
        self.lock().feed_suppressed
    }

    pub fn overlay_visible(&self) -> bool {
        self.lock()
            .overlay
            .as_ref()
            .map(|overlay| overlay.visible)
            .unwrap_or(false)
    }

    pub fn overlay_creations(&self) -> usize {
        self.lock().overlay_creations
    }

    pub fn dashboard(&self) -> Option<DashboardSummary> {
        self.lock().overlay.as_ref().and_then(|overlay| overlay.summary)
    }

    pub fn mutation_count(&self) -> usize {
        self.lock().mutations
    }
}

impl HostPage for MemoryPage {
    fn path(&self) -> String {
        self.lock().path.clone()
    }

    fn content_items(&self) -> Vec<ContentItem> {
        self.lock().cards.iter().map(|card| card.item.clone()).collect()
    }

    fn watch_heading(&self) -> Option<String> {
        self.lock().heading.clone()
    }

    fn is_hidden(&self, id: &str) -> bool {
        self.hidden(id)
    }

    fn set_hidden(&mut self, id: &str, hidden: bool) {
        let mut state = self.lock();
        state.mutations += 1;
        if let Some(card) = state.card_mut(id) {
            card.hidden = hidden;
        }
    }

    fn has_badge(&self, id: &str) -> bool {
        self.badged(id)
    }

    fn attach_badge(&mut self, id: &str) {
        let mut state = self.lock();
        state.mutations += 1;
        if let Some(card) = state.card_mut(id) {
            card.badged = true;
        }
    }

    fn remove_badge(&mut self, id: &str) {
        let mut state = self.lock();
        state.mutations += 1;
        if let Some(card) = state.card_mut(id) {
            card.badged = false;
        }
    }

    fn set_feed_suppressed(&mut self, suppressed: bool) {
        let mut state = self.lock();
        state.mutations += 1;
        state.feed_suppressed = suppressed;
    }

    fn create_overlay(&mut self) {
        let mut state = self.lock();
        state.mutations += 1;
        state.overlay_creations += 1;
        state.overlay = Some(OverlayNode::default());
    }

    fn set_overlay_visible(&mut self, visible: bool) {
        let mut state = self.lock();
        state.mutations += 1;
        if let Some(overlay) = state.overlay.as_mut() {
            overlay.visible = visible;
        }
    }

    fn render_dashboard(&mut self, summary: &DashboardSummary) {
        let mut state = self.lock();
        state.mutations += 1;
        if let Some(overlay) = state.overlay.as_mut() {
            overlay.summary = Some(*summary);
        }
    }
}
