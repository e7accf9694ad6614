use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde::Serialize;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Instant},
};
use uuid::Uuid;

use crate::notify::Notifier;

use super::{TimerMode, TimerState, TimerStatus};

// Set to false to silence timer lifecycle logging
const ENABLE_LOGS: bool = true;

use crate::log_info;

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub remaining_ms: i64,
}

/// Countdown timer with a background ticker that fires a notification when the
/// countdown runs out.
#[derive(Clone)]
pub struct TimerController {
    state: Arc<Mutex<TimerState>>,
    notifier: Arc<dyn Notifier>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
}

impl TimerController {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            state: Arc::new(Mutex::new(TimerState::new())),
            notifier,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
        }
    }

    pub async fn get_state(&self) -> TimerState {
        let mut guard = self.state.lock().await;
        guard.sync_active_from_anchor();
        guard.clone()
    }

    pub async fn get_snapshot(&self) -> TimerSnapshot {
        let mut guard = self.state.lock().await;
        guard.sync_active_from_anchor();
        TimerSnapshot {
            remaining_ms: guard.remaining_ms(),
            state: guard.clone(),
        }
    }

    pub async fn start_timer(&self, target_ms: u64, mode: TimerMode) -> Result<TimerState> {
        if target_ms == 0 {
            return Err(anyhow!("target_ms must be greater than zero"));
        }

        {
            let mut state = self.state.lock().await;
            if state.is_active() {
                return Err(anyhow!("timer already active"));
            }
            let session_id = Uuid::new_v4().to_string();
            log_info!("Starting {mode:?} timer {session_id} for {target_ms}ms");
            state.begin_session(session_id, target_ms, mode, Utc::now(), Instant::now());
        }

        self.spawn_ticker().await;
        Ok(self.get_state().await)
    }

    pub async fn pause_timer(&self) -> Result<TimerState> {
        {
            let mut state = self.state.lock().await;
            if state.status != TimerStatus::Running {
                return Err(anyhow!("no running timer to pause"));
            }
            state.pause();
        }

        self.cancel_ticker().await;
        Ok(self.get_state().await)
    }

    pub async fn resume_timer(&self) -> Result<TimerState> {
        {
            let mut state = self.state.lock().await;
            if state.status != TimerStatus::Paused {
                return Err(anyhow!("no paused timer to resume"));
            }
            state.resume(Instant::now());
        }

        self.spawn_ticker().await;
        Ok(self.get_state().await)
    }

    /// Drops the current countdown without notifying.
    pub async fn reset_timer(&self) {
        self.cancel_ticker().await;
        self.state.lock().await.cancel();
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let notifier = self.notifier.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            loop {
                interval.tick().await;

                let finished = {
                    let mut guard = state.lock().await;
                    if guard.status != TimerStatus::Running {
                        break;
                    }
                    guard.sync_active_from_anchor();
                    if guard.remaining_ms() > 0 {
                        None
                    } else {
                        guard.complete();
                        Some(guard.mode)
                    }
                };

                if let Some(mode) = finished {
                    log_info!("{mode:?} timer completed");
                    let (title, message) = mode.completion_notice();
                    notifier.notify(title, message);
                    break;
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemoryNotifier;

    fn controller() -> (TimerController, Arc<MemoryNotifier>) {
        let notifier = Arc::new(MemoryNotifier::new());
        (TimerController::new(notifier.clone()), notifier)
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_completes_and_notifies() {
        let (timer, notifier) = controller();
        timer.start_timer(3_000, TimerMode::Focus).await.unwrap();

        time::sleep(Duration::from_millis(3_500)).await;

        let snapshot = timer.get_snapshot().await;
        assert_eq!(snapshot.state.status, TimerStatus::Completed);
        assert_eq!(snapshot.remaining_ms, 0);
        assert_eq!(
            notifier.sent(),
            vec![(
                "Focus session complete".to_string(),
                "Great work! Time for a break.".to_string()
            )]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_holds_countdown() {
        let (timer, notifier) = controller();
        timer.start_timer(2_000, TimerMode::Break).await.unwrap();

        time::sleep(Duration::from_millis(500)).await;
        timer.pause_timer().await.unwrap();
        time::sleep(Duration::from_millis(10_000)).await;

        let snapshot = timer.get_snapshot().await;
        assert_eq!(snapshot.state.status, TimerStatus::Paused);
        assert_eq!(snapshot.remaining_ms, 1_500);
        assert!(notifier.sent().is_empty());

        timer.resume_timer().await.unwrap();
        time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(notifier.sent()[0].0, "Break over");
    }

    #[tokio::test]
    async fn test_rejects_zero_and_double_start() {
        let (timer, _) = controller();
        assert!(timer.start_timer(0, TimerMode::Focus).await.is_err());

        timer.start_timer(60_000, TimerMode::Focus).await.unwrap();
        assert!(timer.start_timer(60_000, TimerMode::Focus).await.is_err());

        timer.reset_timer().await;
        assert_eq!(timer.get_state().await.status, TimerStatus::Idle);
        assert!(timer.start_timer(60_000, TimerMode::Focus).await.is_ok());
    }

    #[tokio::test]
    async fn test_pause_requires_running_timer() {
        let (timer, _) = controller();
        assert!(timer.pause_timer().await.is_err());
        assert!(timer.resume_timer().await.is_err());
    }
}
