use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Messages the content script accepts from the rest of the extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtensionMessage {
    /// Carries the full settings object; replaces the in-memory copy wholesale.
    SettingsUpdated { settings: Settings },
}

impl ExtensionMessage {
    pub fn from_json(raw: &str) -> Result<Self> {
        let message: ExtensionMessage =
            serde_json::from_str(raw).context("unrecognized extension message")?;
        Ok(match message {
            ExtensionMessage::SettingsUpdated { settings } => ExtensionMessage::SettingsUpdated {
                settings: settings.normalized(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings_updated() {
        let raw = r#"{
            "type": "SETTINGS_UPDATED",
            "settings": {
                "focusModeEnabled": false,
                "allowedKeywords": ["Python"],
                "blockedKeywords": ["prank"]
            }
        }"#;

        let ExtensionMessage::SettingsUpdated { settings } = ExtensionMessage::from_json(raw).unwrap();
        assert!(!settings.focus_mode_enabled);
        assert_eq!(settings.allowed_keywords, vec!["python"]);
        assert_eq!(settings.stats.blocked_count, 0);
    }

    #[test]
    fn test_tag_serialization() {
        let message = ExtensionMessage::SettingsUpdated {
            settings: Settings::default(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "SETTINGS_UPDATED");
    }

    #[test]
    fn test_unknown_message_rejected() {
        assert!(ExtensionMessage::from_json(r#"{"type": "PING"}"#).is_err());
    }
}
