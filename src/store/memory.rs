use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::settings::Settings;

use super::SettingsStore;

/// Process-local store. Used when persistence is disabled, and as a test double
/// whose failure mode can be switched on to simulate an unavailable backend.
#[derive(Default)]
pub struct MemorySettingsStore {
    data: Mutex<Option<Settings>>,
    failing: AtomicBool,
    saves: AtomicUsize,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            data: Mutex::new(Some(settings)),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Snapshot of the stored document, bypassing the failure switch.
    pub fn snapshot(&self) -> Option<Settings> {
        match self.data.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("settings store unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<Option<Settings>> {
        self.check_available()?;
        Ok(self.snapshot())
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        self.check_available()?;
        let mut guard = match self.data.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(settings.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
