use std::time::Duration;

use tokio::time::Instant;

const MINUTE: Duration = Duration::from_secs(60);

/// Coarse, sampling-based educational watch-time counter.
///
/// Each sample while an educational video is playing reports the whole minutes
/// elapsed since the baseline and advances the baseline by exactly that much, so
/// the sub-minute remainder carries into the next sample. Time after the last
/// sample is lost when the viewer leaves before the next full minute.
#[derive(Debug, Default)]
pub struct WatchTimeTracker {
    baseline: Option<Instant>,
}

impl WatchTimeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whole minutes to report for this sample.
    pub fn sample(&mut self, educational: bool, now: Instant) -> u64 {
        if !educational {
            self.baseline = None;
            return 0;
        }

        let Some(baseline) = self.baseline else {
            self.baseline = Some(now);
            return 0;
        };

        let elapsed = now.saturating_duration_since(baseline);
        let minutes = elapsed.as_secs() / MINUTE.as_secs();
        if minutes > 0 {
            self.baseline = Some(baseline + MINUTE * minutes as u32);
        }
        minutes
    }

    /// Stops counting until the next educational sample.
    pub fn reset(&mut self) {
        self.baseline = None;
    }

    pub fn baseline(&self) -> Option<Instant> {
        self.baseline
    }
}
