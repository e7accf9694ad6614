use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};

use crate::settings::{Settings, StatsDelta};

use super::SettingsStore;

/// Settings persisted as a single pretty-printed JSON document.
pub struct JsonFileSettingsStore {
    path: PathBuf,
    // Serializes read-modify-write cycles from `record_stats`.
    write_lock: Mutex<()>,
}

impl JsonFileSettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory {}", parent.display())
            })?;
        }

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Option<Settings>> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let settings = Settings::from_json(&contents)
            .with_context(|| format!("Malformed settings in {}", self.path.display()))?;
        Ok(Some(settings))
    }

    async fn persist(&self, settings: &Settings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, serialized)
            .await
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[async_trait]
impl SettingsStore for JsonFileSettingsStore {
    async fn load(&self) -> Result<Option<Settings>> {
        self.read().await
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.persist(settings).await
    }

    async fn record_stats(&self, delta: StatsDelta, today: NaiveDate) -> Result<Settings> {
        let _guard = self.write_lock.lock().await;
        let mut settings = self.read().await?.unwrap_or_default();
        settings.stats.apply(delta, today);
        self.persist(&settings).await?;
        Ok(settings)
    }
}
