//! The host page as seen by the reconciler.
//!
//! Everything the reconciler needs from the DOM goes through [`HostPage`]; item
//! memoization is kept on the reconciler side, keyed by [`ContentItem::id`].

mod html;
mod memory;

pub use html::{parse_snapshot, PageSnapshot};
pub use memory::MemoryPage;

use serde::{Deserialize, Serialize};

/// Stable handle of one content card node. Two cards showing the same video get
/// distinct handles; see [`node_id`].
pub type ItemId = String;

/// Handle for the `occurrence`-th card (zero based) showing `video_id`.
pub fn node_id(video_id: &str, occurrence: usize) -> ItemId {
    if occurrence == 0 {
        video_id.to_string()
    } else {
        format!("{video_id}#{occurrence}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    Video,
    Short,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: ItemId,
    pub video_id: String,
    pub kind: ItemKind,
    pub title: String,
    pub channel: String,
}

impl ContentItem {
    pub fn video(id: impl Into<String>, title: impl Into<String>, channel: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            video_id: id.clone(),
            id,
            kind: ItemKind::Video,
            title: title.into(),
            channel: channel.into(),
        }
    }

    pub fn short(id: impl Into<String>, title: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            video_id: id.clone(),
            id,
            kind: ItemKind::Short,
            title: title.into(),
            channel: String::new(),
        }
    }

    /// Title and channel name, case-folded, as fed to the classifier.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.channel).to_lowercase()
    }
}

/// Figures shown on the home-page dashboard overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub focus_streak: u64,
    pub educational_minutes: u64,
    pub blocked_count: u64,
}

/// DOM capability provided by the embedding host.
pub trait HostPage {
    /// Path component of the current location, e.g. `/watch`.
    fn path(&self) -> String;

    /// Every content card currently in the document, in document order.
    fn content_items(&self) -> Vec<ContentItem>;

    /// Primary heading text on a watch page, if rendered yet.
    fn watch_heading(&self) -> Option<String>;

    fn is_hidden(&self, id: &str) -> bool;
    fn set_hidden(&mut self, id: &str, hidden: bool);

    fn has_badge(&self, id: &str) -> bool;
    fn attach_badge(&mut self, id: &str);
    fn remove_badge(&mut self, id: &str);

    fn set_feed_suppressed(&mut self, suppressed: bool);

    /// Inserts the overlay node. Called at most once per page lifetime.
    fn create_overlay(&mut self);
    fn set_overlay_visible(&mut self, visible: bool);
    fn render_dashboard(&mut self, summary: &DashboardSummary);
}
