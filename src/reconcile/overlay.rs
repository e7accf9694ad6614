use crate::page::{DashboardSummary, HostPage};

use super::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayDecision {
    pub show_overlay: bool,
    pub suppress_feed: bool,
}

/// The dashboard replaces the feed only on the home surface with focus mode on.
pub fn overlay_decision(surface: Surface, enabled: bool) -> OverlayDecision {
    let show = enabled && surface == Surface::Home;
    OverlayDecision {
        show_overlay: show,
        suppress_feed: show,
    }
}

/// Tracks what the page currently shows so [`OverlayToggle::sync`] only touches
/// the DOM on a change. The overlay node is created lazily, once.
#[derive(Debug, Default)]
pub struct OverlayToggle {
    created: bool,
    visible: bool,
    feed_suppressed: bool,
    rendered: Option<DashboardSummary>,
}

impl OverlayToggle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync<P: HostPage>(
        &mut self,
        page: &mut P,
        surface: Surface,
        enabled: bool,
        summary: DashboardSummary,
    ) {
        let decision = overlay_decision(surface, enabled);

        if decision.show_overlay {
            if !self.created {
                page.create_overlay();
                self.created = true;
            }
            if self.rendered != Some(summary) {
                page.render_dashboard(&summary);
                self.rendered = Some(summary);
            }
            if !self.visible {
                page.set_overlay_visible(true);
                self.visible = true;
            }
        } else if self.visible {
            page.set_overlay_visible(false);
            self.visible = false;
        }

        if decision.suppress_feed != self.feed_suppressed {
            page.set_feed_suppressed(decision.suppress_feed);
            self.feed_suppressed = decision.suppress_feed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MemoryPage;

    #[test]
    fn test_decision_table() {
        assert!(overlay_decision(Surface::Home, true).show_overlay);
        assert!(!overlay_decision(Surface::Home, false).show_overlay);
        assert!(!overlay_decision(Surface::Watch, true).show_overlay);
        assert!(!overlay_decision(Surface::Other, true).suppress_feed);
    }

    #[test]
    fn test_overlay_created_once() {
        let mut page = MemoryPage::new("/");
        let mut toggle = OverlayToggle::new();
        let summary = DashboardSummary::default();

        toggle.sync(&mut page, Surface::Home, true, summary);
        toggle.sync(&mut page, Surface::Watch, true, summary);
        toggle.sync(&mut page, Surface::Home, true, summary);

        assert_eq!(page.overlay_creations(), 1);
        assert!(page.overlay_visible());
        assert!(page.feed_suppressed());
    }

    #[test]
    fn test_disable_restores_feed() {
        let mut page = MemoryPage::new("/");
        let mut toggle = OverlayToggle::new();
        let summary = DashboardSummary::default();

        toggle.sync(&mut page, Surface::Home, true, summary);
        toggle.sync(&mut page, Surface::Home, false, summary);

        assert!(!page.overlay_visible());
        assert!(!page.feed_suppressed());
    }

    #[test]
    fn test_disabled_never_creates_overlay() {
        let mut page = MemoryPage::new("/");
        let mut toggle = OverlayToggle::new();

        toggle.sync(&mut page, Surface::Home, false, DashboardSummary::default());

        assert_eq!(page.overlay_creations(), 0);
        assert_eq!(page.mutation_count(), 0);
    }

    #[test]
    fn test_summary_rerendered_only_on_change() {
        let mut page = MemoryPage::new("/");
        let mut toggle = OverlayToggle::new();
        let mut summary = DashboardSummary::default();

        toggle.sync(&mut page, Surface::Home, true, summary);
        let after_first = page.mutation_count();
        toggle.sync(&mut page, Surface::Home, true, summary);
        assert_eq!(page.mutation_count(), after_first);

        summary.blocked_count = 3;
        toggle.sync(&mut page, Surface::Home, true, summary);
        assert_eq!(page.mutation_count(), after_first + 1);
        assert_eq!(page.dashboard(), Some(summary));
    }
}
