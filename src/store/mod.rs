//! Persistence adapters for the focus settings document.
//!
//! The content script only ever talks to [`SettingsStore`]; the concrete backend is
//! picked from [`StoreBackend`] at bootstrap.

mod json_file;
mod memory;
mod sqlite;

pub use json_file::JsonFileSettingsStore;
pub use memory::MemorySettingsStore;
pub use sqlite::SqliteSettingsStore;

use std::{path::Path, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::StoreBackend;
use crate::settings::{Settings, StatsDelta};

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Returns the last persisted settings, or `None` when nothing was saved yet.
    async fn load(&self) -> Result<Option<Settings>>;

    async fn save(&self, settings: &Settings) -> Result<()>;

    /// Merges an additive stats update into the persisted document.
    async fn record_stats(&self, delta: StatsDelta, today: NaiveDate) -> Result<Settings> {
        let mut settings = self.load().await?.unwrap_or_default();
        settings.stats.apply(delta, today);
        self.save(&settings).await?;
        Ok(settings)
    }
}

pub fn open_store(backend: StoreBackend, data_dir: &Path) -> Result<Arc<dyn SettingsStore>> {
    let store: Arc<dyn SettingsStore> = match backend {
        StoreBackend::JsonFile => {
            Arc::new(JsonFileSettingsStore::new(data_dir.join("settings.json"))?)
        }
        StoreBackend::Sqlite => {
            Arc::new(SqliteSettingsStore::new(data_dir.join("focusfeed.sqlite3"))?)
        }
        StoreBackend::Memory => Arc::new(MemorySettingsStore::new()),
    };
    Ok(store)
}
