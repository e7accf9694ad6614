use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Local;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::ScriptConfig,
    messages::ExtensionMessage,
    page::HostPage,
    reconcile::{Reconciler, ScanReport, ScanScheduler},
    settings::{Settings, Stats, StatsDelta},
    store::SettingsStore,
};

// Set to false to silence per-pass logging from the reconciliation loop
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Something happened on the host page or in the extension.
#[derive(Debug, Clone)]
pub enum PageEvent {
    /// Structural DOM change; debounced before scanning.
    Mutation,
    /// In-app navigation finished; invalidates all processed markers.
    Navigation,
    Message(ExtensionMessage),
}

/// Owns the background reconciliation task for one page.
pub struct ContentScript {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    events: Option<mpsc::UnboundedSender<PageEvent>>,
}

impl Default for ContentScript {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentScript {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
            events: None,
        }
    }

    /// Spawns the reconciliation loop. Must be called from within a tokio runtime.
    pub fn start<P>(
        &mut self,
        page: P,
        store: Arc<dyn SettingsStore>,
        config: ScriptConfig,
    ) -> Result<()>
    where
        P: HostPage + Send + 'static,
    {
        if self.handle.is_some() {
            bail!("content script already running");
        }

        let cancel_token = CancellationToken::new();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(reconcile_loop(
            page,
            store,
            config,
            events_rx,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.events = Some(events_tx);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }

    pub fn dispatch(&self, event: PageEvent) -> Result<()> {
        let sender = self
            .events
            .as_ref()
            .ok_or_else(|| anyhow!("content script is not running"))?;
        sender
            .send(event)
            .map_err(|_| anyhow!("content script loop has exited"))
    }

    /// Parses a raw extension message and forwards it to the loop.
    pub fn handle_message(&self, raw: &str) -> Result<()> {
        let message = ExtensionMessage::from_json(raw)?;
        self.dispatch(PageEvent::Message(message))
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.events = None;

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("content script task failed to join")
        } else {
            Ok(())
        }
    }
}

impl Drop for ContentScript {
    fn drop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
    }
}

// Upper bound on the final stats flush when the loop shuts down.
const REPORT_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

type RecordFuture = Pin<Box<dyn Future<Output = Result<Settings>> + Send>>;

/// A `record_stats` call that has not settled yet.
struct InFlight {
    delta: StatsDelta,
    call: RecordFuture,
}

fn start_report(store: &Arc<dyn SettingsStore>, pending: &mut StatsDelta) -> Option<InFlight> {
    if pending.is_empty() {
        return None;
    }

    let delta = std::mem::take(pending);
    let store = store.clone();
    let today = Local::now().date_naive();
    Some(InFlight {
        delta,
        call: Box::pin(async move { store.record_stats(delta, today).await }),
    })
}

async fn next_settled(in_flight: &mut Option<InFlight>) -> (StatsDelta, Result<Settings>) {
    match in_flight {
        Some(report) => {
            let result = report.call.as_mut().await;
            (report.delta, result)
        }
        None => std::future::pending().await,
    }
}

fn settle(
    delta: StatsDelta,
    result: Result<Settings>,
    pending: &mut StatsDelta,
    persisted: &mpsc::UnboundedSender<Stats>,
) {
    match result {
        Ok(settings) => {
            log_debug!(
                "reported stats: +{} blocked, +{} minutes",
                delta.blocked_count,
                delta.educational_minutes
            );
            // The loop may already be gone during the final flush.
            let _ = persisted.send(settings.stats);
        }
        Err(err) => {
            log_warn!("failed to report stats, keeping {delta:?} for the next attempt: {err:?}");
            pending.merge(delta);
        }
    }
}

/// Persists stats deltas on its own task so a slow or stalled store never holds
/// up the reconciliation loop. At most one store call is in flight; deltas that
/// arrive meanwhile, or that a failed call left behind, go out with the next
/// attempt. Stats confirmed by the store are sent back on `persisted`.
async fn report_stats(
    store: Arc<dyn SettingsStore>,
    mut deltas: mpsc::UnboundedReceiver<StatsDelta>,
    persisted: mpsc::UnboundedSender<Stats>,
) {
    let mut pending = StatsDelta::default();
    let mut in_flight: Option<InFlight> = None;

    loop {
        tokio::select! {
            delta = deltas.recv() => {
                let Some(delta) = delta else {
                    break;
                };
                pending.merge(delta);
                if in_flight.is_none() {
                    in_flight = start_report(&store, &mut pending);
                }
            }
            (delta, result) = next_settled(&mut in_flight) => {
                in_flight = None;
                let succeeded = result.is_ok();
                settle(delta, result, &mut pending, &persisted);
                if succeeded {
                    in_flight = start_report(&store, &mut pending);
                }
            }
        }
    }

    // Last chance for anything still queued.
    if let Some(report) = in_flight.take() {
        let result = report.call.await;
        settle(report.delta, result, &mut pending, &persisted);
    }
    if let Some(report) = start_report(&store, &mut pending) {
        let result = report.call.await;
        settle(report.delta, result, &mut pending, &persisted);
    }
    if !pending.is_empty() {
        log_warn!("dropping unreported stats on shutdown: {pending:?}");
    }
}

fn queue_report(deltas: &mpsc::UnboundedSender<StatsDelta>, delta: StatsDelta) {
    if delta.is_empty() {
        return;
    }
    if deltas.send(delta).is_err() {
        log_warn!("stats reporter has exited, dropping {delta:?}");
    }
}

async fn load_settings(store: &dyn SettingsStore) -> Settings {
    match store.load().await {
        Ok(Some(settings)) => settings.normalized(),
        Ok(None) => {
            log_info!("no stored settings found, using defaults");
            Settings::default()
        }
        Err(err) => {
            log_warn!("failed to load settings, using defaults: {err:?}");
            Settings::default()
        }
    }
}

async fn sleep_until_due(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

fn log_scan(trigger: &str, report: &ScanReport) {
    if report.processed == 0 && report.educational_minutes == 0 {
        return;
    }
    log_info!(
        "{trigger} scan: {} processed ({} blocked, {} educational, {} neutral, {} shorts), {} skipped, {} min",
        report.processed,
        report.blocked,
        report.educational,
        report.neutral,
        report.shorts_hidden,
        report.skipped,
        report.educational_minutes
    );
}

pub async fn reconcile_loop<P: HostPage>(
    mut page: P,
    store: Arc<dyn SettingsStore>,
    config: ScriptConfig,
    mut events: mpsc::UnboundedReceiver<PageEvent>,
    cancel_token: CancellationToken,
) {
    let settings = load_settings(store.as_ref()).await;
    let mut reconciler = Reconciler::new(settings);
    let mut scheduler = ScanScheduler::new();
    scheduler.request(Instant::now(), config.initial_settle);

    let (deltas_tx, deltas_rx) = mpsc::unbounded_channel();
    let (persisted_tx, mut persisted_rx) = mpsc::unbounded_channel();
    let mut reporter = tokio::spawn(report_stats(store, deltas_rx, persisted_tx));

    let mut poll = tokio::time::interval_at(
        Instant::now() + config.poll_interval,
        config.poll_interval,
    );
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let deadline = scheduler.deadline();

        tokio::select! {
            _ = cancel_token.cancelled() => {
                log_info!("content script shutting down");
                break;
            }
            event = events.recv() => {
                let Some(event) = event else {
                    log_info!("event channel closed, stopping content script");
                    break;
                };

                match event {
                    PageEvent::Mutation => {
                        scheduler.request(Instant::now(), config.mutation_debounce);
                    }
                    PageEvent::Navigation => {
                        reconciler.navigate(&mut page);
                        scheduler.request(Instant::now(), config.navigation_settle);
                    }
                    PageEvent::Message(ExtensionMessage::SettingsUpdated { settings }) => {
                        let enabled = settings.focus_mode_enabled;
                        let report = reconciler.apply_settings(&mut page, settings, Instant::now());
                        if enabled {
                            log_scan("settings", &report);
                        } else {
                            log_info!("focus mode disabled, effects cleared");
                        }
                        queue_report(&deltas_tx, report.stats_delta());
                    }
                }
            }
            Some(stats) = persisted_rx.recv() => {
                reconciler.adopt_stats(&mut page, stats);
            }
            _ = poll.tick() => {
                scheduler.request(Instant::now(), Duration::ZERO);
            }
            _ = sleep_until_due(deadline) => {
                if scheduler.take_due(Instant::now()) {
                    let report = reconciler.scan(&mut page, Instant::now());
                    log_scan("scheduled", &report);
                    queue_report(&deltas_tx, report.stats_delta());
                }
            }
        }
    }

    drop(deltas_tx);
    match tokio::time::timeout(REPORT_FLUSH_TIMEOUT, &mut reporter).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => log_error!("stats reporter task failed: {err:?}"),
        Err(_) => {
            log_warn!("stats flush timed out, abandoning pending report");
            reporter.abort();
        }
    }
}
