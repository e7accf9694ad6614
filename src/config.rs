use std::{path::PathBuf, time::Duration};

use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    JsonFile,
    Sqlite,
    Memory,
}

impl StoreBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" | "file" => Some(StoreBackend::JsonFile),
            "sqlite" | "db" => Some(StoreBackend::Sqlite),
            "memory" | "none" => Some(StoreBackend::Memory),
            _ => None,
        }
    }
}

/// Timing and persistence knobs for the content script.
#[derive(Debug, Clone)]
pub struct ScriptConfig {
    /// Delay before the first scan, letting the host render its first batch.
    pub initial_settle: Duration,

    /// Structural-change notifications inside this window collapse into one scan.
    pub mutation_debounce: Duration,

    /// Fallback poll for insertions the mutation feed missed.
    pub poll_interval: Duration,

    /// Delay between a navigation event and the rescan it triggers.
    pub navigation_settle: Duration,

    pub store_backend: StoreBackend,
    pub data_dir: PathBuf,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            initial_settle: Duration::from_millis(1500),
            mutation_debounce: Duration::from_millis(300),
            poll_interval: Duration::from_millis(2000),
            navigation_settle: Duration::from_millis(500),
            store_backend: StoreBackend::JsonFile,
            data_dir: PathBuf::from("focusfeed-data"),
        }
    }
}

impl ScriptConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ms) =
            lookup("FOCUSFEED_POLL_MS").and_then(|v| parse_millis("FOCUSFEED_POLL_MS", &v))
        {
            config.poll_interval = ms;
        }
        if let Some(ms) =
            lookup("FOCUSFEED_DEBOUNCE_MS").and_then(|v| parse_millis("FOCUSFEED_DEBOUNCE_MS", &v))
        {
            config.mutation_debounce = ms;
        }
        if let Some(raw) = lookup("FOCUSFEED_STORE") {
            match StoreBackend::parse(&raw) {
                Some(backend) => config.store_backend = backend,
                None => warn!("Ignoring unknown FOCUSFEED_STORE value '{raw}'"),
            }
        }
        if let Some(dir) = lookup("FOCUSFEED_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        let debug_mode = lookup("FOCUSFEED_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if debug_mode {
            config.poll_interval /= 2;
        }

        config
    }
}

fn parse_millis(key: &str, value: &str) -> Option<Duration> {
    match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => {
            warn!("Ignoring invalid {key} value '{value}'");
            None
        }
        Ok(ms) => Some(Duration::from_millis(ms)),
    }
}
