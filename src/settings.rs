use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const BASELINE_ALLOWED: &[&str] = &[
    "tutorial",
    "course",
    "lecture",
    "learn",
    "lesson",
    "explained",
    "how to",
    "programming",
    "python",
    "javascript",
    "math",
    "science",
    "physics",
    "history",
    "documentary",
];

const BASELINE_BLOCKED: &[&str] = &[
    "prank",
    "reaction",
    "gaming",
    "drama",
    "gossip",
    "challenge",
    "mukbang",
    "tiktok",
    "meme",
    "fortnite",
];

pub fn baseline_allowed_keywords() -> Vec<String> {
    BASELINE_ALLOWED.iter().map(|k| (*k).to_string()).collect()
}

pub fn baseline_blocked_keywords() -> Vec<String> {
    BASELINE_BLOCKED.iter().map(|k| (*k).to_string()).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    pub educational_minutes: u64,
    pub blocked_count: u64,
    pub focus_streak: u64,
    pub last_active_date: Option<NaiveDate>,
}

impl Stats {
    /// Folds an additive delta into the totals. Educational minutes mark `today`
    /// as an active day for the streak.
    pub fn apply(&mut self, delta: StatsDelta, today: NaiveDate) {
        self.educational_minutes = self
            .educational_minutes
            .saturating_add(delta.educational_minutes);
        self.blocked_count = self.blocked_count.saturating_add(delta.blocked_count);

        if delta.educational_minutes > 0 {
            self.mark_active(today);
        }
    }

    fn mark_active(&mut self, today: NaiveDate) {
        match self.last_active_date {
            Some(last) if last == today => {}
            Some(last) if last.succ_opt() == Some(today) => {
                self.focus_streak = self.focus_streak.saturating_add(1);
            }
            _ => self.focus_streak = 1,
        }
        self.last_active_date = Some(today);
    }
}

/// Partial stats update reported by the content script. Always additive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDelta {
    pub educational_minutes: u64,
    pub blocked_count: u64,
}

impl StatsDelta {
    pub fn is_empty(&self) -> bool {
        self.educational_minutes == 0 && self.blocked_count == 0
    }

    pub fn merge(&mut self, other: StatsDelta) {
        self.educational_minutes = self
            .educational_minutes
            .saturating_add(other.educational_minutes);
        self.blocked_count = self.blocked_count.saturating_add(other.blocked_count);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub focus_mode_enabled: bool,
    pub allowed_keywords: Vec<String>,
    pub blocked_keywords: Vec<String>,
    pub stats: Stats,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_mode_enabled: true,
            allowed_keywords: baseline_allowed_keywords(),
            blocked_keywords: baseline_blocked_keywords(),
            stats: Stats::default(),
        }
    }
}

impl Settings {
    /// Parses a stored settings document, filling missing fields from the baseline.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Settings>(raw).map(Settings::normalized)
    }

    /// Lowercases and trims keywords, dropping blanks and later duplicates.
    pub fn normalized(mut self) -> Self {
        self.allowed_keywords = normalize_keywords(self.allowed_keywords);
        self.blocked_keywords = normalize_keywords(self.blocked_keywords);
        self
    }
}

fn normalize_keywords(keywords: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() || out.contains(&keyword) {
            continue;
        }
        out.push(keyword);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_missing_fields_use_baseline() {
        let settings = Settings::from_json(r#"{"focusModeEnabled": false}"#).unwrap();

        assert!(!settings.focus_mode_enabled);
        assert_eq!(settings.allowed_keywords, baseline_allowed_keywords());
        assert_eq!(settings.blocked_keywords, baseline_blocked_keywords());
        assert_eq!(settings.stats, Stats::default());
    }

    #[test]
    fn test_partial_stats_default_to_zero() {
        let settings =
            Settings::from_json(r#"{"stats": {"blockedCount": 7, "lastActiveDate": "2024-03-01"}}"#)
                .unwrap();

        assert_eq!(settings.stats.blocked_count, 7);
        assert_eq!(settings.stats.educational_minutes, 0);
        assert_eq!(settings.stats.focus_streak, 0);
        assert_eq!(settings.stats.last_active_date, Some(date(2024, 3, 1)));
    }

    #[test]
    fn test_keywords_are_normalized() {
        let settings = Settings::from_json(
            r#"{"allowedKeywords": ["  Python ", "", "RUST", "python"], "blockedKeywords": ["Prank"]}"#,
        )
        .unwrap();

        assert_eq!(settings.allowed_keywords, vec!["python", "rust"]);
        assert_eq!(settings.blocked_keywords, vec!["prank"]);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(Settings::default()).unwrap();

        assert_eq!(json["focusModeEnabled"], true);
        assert!(json["allowedKeywords"].is_array());
        assert_eq!(json["stats"]["educationalMinutes"], 0);
        assert!(json["stats"]["lastActiveDate"].is_null());
    }

    #[test]
    fn test_streak_progression() {
        let mut stats = Stats::default();
        let minutes = StatsDelta {
            educational_minutes: 3,
            blocked_count: 0,
        };

        stats.apply(minutes, date(2024, 5, 1));
        assert_eq!(stats.focus_streak, 1);

        stats.apply(minutes, date(2024, 5, 1));
        assert_eq!(stats.focus_streak, 1);
        assert_eq!(stats.educational_minutes, 6);

        stats.apply(minutes, date(2024, 5, 2));
        assert_eq!(stats.focus_streak, 2);

        stats.apply(minutes, date(2024, 5, 5));
        assert_eq!(stats.focus_streak, 1);
        assert_eq!(stats.last_active_date, Some(date(2024, 5, 5)));
    }

    #[test]
    fn test_blocked_only_delta_does_not_touch_streak() {
        let mut stats = Stats::default();
        stats.apply(
            StatsDelta {
                educational_minutes: 0,
                blocked_count: 4,
            },
            date(2024, 5, 1),
        );

        assert_eq!(stats.blocked_count, 4);
        assert_eq!(stats.focus_streak, 0);
        assert_eq!(stats.last_active_date, None);
    }

    #[test]
    fn test_delta_merge() {
        let mut pending = StatsDelta::default();
        assert!(pending.is_empty());

        pending.merge(StatsDelta {
            educational_minutes: 1,
            blocked_count: 2,
        });
        pending.merge(StatsDelta {
            educational_minutes: 0,
            blocked_count: 3,
        });

        assert_eq!(pending.educational_minutes, 1);
        assert_eq!(pending.blocked_count, 5);
    }
}
