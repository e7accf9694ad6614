use std::collections::HashSet;

use tokio::time::Instant;

use crate::classifier::{classify, matches_any, Classification};
use crate::page::{DashboardSummary, HostPage, ItemKind};
use crate::settings::{Settings, Stats, StatsDelta};

use super::{ItemLedger, ItemState, OverlayToggle, Surface, WatchTimeTracker};

/// Outcome of one scan pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Items classified (or force-hidden) during this pass.
    pub processed: usize,
    /// Items skipped because they were already processed.
    pub skipped: usize,
    pub blocked: u64,
    pub educational: usize,
    pub neutral: usize,
    pub shorts_hidden: usize,
    pub educational_minutes: u64,
}

impl ScanReport {
    pub fn stats_delta(&self) -> StatsDelta {
        StatsDelta {
            educational_minutes: self.educational_minutes,
            blocked_count: self.blocked,
        }
    }
}

/// Keeps the page's visible item set consistent with the current settings.
///
/// Owns the in-memory settings copy; every update is an explicit wholesale
/// replacement through [`Reconciler::apply_settings`].
#[derive(Debug)]
pub struct Reconciler {
    settings: Settings,
    ledger: ItemLedger,
    overlay: OverlayToggle,
    watch_time: WatchTimeTracker,
}

impl Reconciler {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ledger: ItemLedger::new(),
            overlay: OverlayToggle::new(),
            watch_time: WatchTimeTracker::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn ledger(&self) -> &ItemLedger {
        &self.ledger
    }

    pub fn summary(&self) -> DashboardSummary {
        let stats = &self.settings.stats;
        DashboardSummary {
            focus_streak: stats.focus_streak,
            educational_minutes: stats.educational_minutes,
            blocked_count: stats.blocked_count,
        }
    }

    /// Classifies every item not yet processed and applies its display state.
    /// With focus mode off this touches nothing beyond hiding a visible overlay.
    pub fn scan<P: HostPage>(&mut self, page: &mut P, now: Instant) -> ScanReport {
        let surface = Surface::from_path(&page.path());
        let enabled = self.settings.focus_mode_enabled;
        let summary = self.summary();
        self.overlay.sync(page, surface, enabled, summary);

        if !enabled {
            self.watch_time.reset();
            return ScanReport::default();
        }

        let mut report = ScanReport::default();
        let items = page.content_items();

        for item in &items {
            if self.ledger.is_processed(&item.id) {
                report.skipped += 1;
                continue;
            }

            let state = match item.kind {
                ItemKind::Short => {
                    report.shorts_hidden += 1;
                    ItemState::Hidden
                }
                ItemKind::Video => match classify(
                    &item.combined_text(),
                    &self.settings.allowed_keywords,
                    &self.settings.blocked_keywords,
                ) {
                    Classification::Blocked => {
                        report.blocked += 1;
                        ItemState::Hidden
                    }
                    Classification::Educational => {
                        report.educational += 1;
                        ItemState::VisibleBadged
                    }
                    Classification::Neutral => {
                        report.neutral += 1;
                        ItemState::VisiblePlain
                    }
                },
            };

            apply_state(page, &item.id, state);
            self.ledger.mark(item.id.clone(), state);
            report.processed += 1;
        }

        let present: HashSet<&str> = items.iter().map(|item| item.id.as_str()).collect();
        self.ledger.retain_present(&present);

        if surface == Surface::Watch {
            let educational = page
                .watch_heading()
                .map(|heading| matches_any(&heading, &self.settings.allowed_keywords))
                .unwrap_or(false);
            report.educational_minutes = self.watch_time.sample(educational, now);
        } else {
            self.watch_time.reset();
        }

        report
    }

    /// Navigation replaces the item set: drop every processed marker and
    /// re-evaluate the overlay for the new location.
    pub fn navigate<P: HostPage>(&mut self, page: &mut P) {
        self.ledger.clear();
        let surface = Surface::from_path(&page.path());
        let summary = self.summary();
        self.overlay
            .sync(page, surface, self.settings.focus_mode_enabled, summary);
    }

    /// Returns every item to its plain display state and strips all markers.
    pub fn clear_effects<P: HostPage>(&mut self, page: &mut P) {
        for item in page.content_items() {
            if page.is_hidden(&item.id) {
                page.set_hidden(&item.id, false);
            }
            if page.has_badge(&item.id) {
                page.remove_badge(&item.id);
            }
        }

        self.ledger.clear();
        self.watch_time.reset();

        let surface = Surface::from_path(&page.path());
        let summary = self.summary();
        self.overlay.sync(page, surface, false, summary);
    }

    /// Replaces the in-memory settings. When enabled the whole visible set is
    /// re-evaluated immediately; when disabled all effects are cleared.
    pub fn apply_settings<P: HostPage>(
        &mut self,
        page: &mut P,
        settings: Settings,
        now: Instant,
    ) -> ScanReport {
        self.settings = settings.normalized();

        if self.settings.focus_mode_enabled {
            self.ledger.clear();
            self.scan(page, now)
        } else {
            self.clear_effects(page);
            ScanReport::default()
        }
    }

    /// Adopts stats confirmed by the store and refreshes the dashboard if shown.
    pub fn adopt_stats<P: HostPage>(&mut self, page: &mut P, stats: Stats) {
        self.settings.stats = stats;
        let surface = Surface::from_path(&page.path());
        let summary = self.summary();
        self.overlay
            .sync(page, surface, self.settings.focus_mode_enabled, summary);
    }
}

fn apply_state<P: HostPage>(page: &mut P, id: &str, state: ItemState) {
    let hide = state == ItemState::Hidden;
    if page.is_hidden(id) != hide {
        page.set_hidden(id, hide);
    }

    let badge = state == ItemState::VisibleBadged;
    let has_badge = page.has_badge(id);
    if badge && !has_badge {
        page.attach_badge(id);
    } else if !badge && has_badge {
        page.remove_badge(id);
    }
}
