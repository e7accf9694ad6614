pub mod classifier;
pub mod config;
pub mod content_script;
pub mod messages;
pub mod notify;
pub mod page;
pub mod reconcile;
pub mod settings;
pub mod store;
pub mod timer;
mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};

pub use classifier::{classify, Classification};
pub use config::{ScriptConfig, StoreBackend};
pub use content_script::{ContentScript, PageEvent};
pub use messages::ExtensionMessage;
pub use notify::{LogNotifier, Notifier};
pub use page::{ContentItem, HostPage, MemoryPage};
pub use settings::{Settings, Stats, StatsDelta};
pub use store::SettingsStore;
pub use timer::{TimerController, TimerMode};

/// Everything a host keeps alive for one page.
pub struct FocusApp {
    pub script: ContentScript,
    pub timer: TimerController,
    pub store: Arc<dyn SettingsStore>,
}

impl FocusApp {
    pub async fn shutdown(mut self) -> Result<()> {
        self.timer.reset_timer().await;
        self.script.stop().await
    }
}

/// Initializes `env_logger` from `RUST_LOG`, defaulting to `info`. Safe to call
/// more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Opens the configured settings store and starts the content script on `page`.
/// Must be called from within a tokio runtime.
pub fn start<P>(page: P, config: ScriptConfig, notifier: Arc<dyn Notifier>) -> Result<FocusApp>
where
    P: HostPage + Send + 'static,
{
    log::info!("FocusFeed starting up...");

    let store = store::open_store(config.store_backend, &config.data_dir)
        .with_context(|| format!("failed to open settings store in {}", config.data_dir.display()))?;

    let mut script = ContentScript::new();
    script.start(page, store.clone(), config)?;

    Ok(FocusApp {
        script,
        timer: TimerController::new(notifier),
        store,
    })
}
