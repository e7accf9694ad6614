use std::time::Duration;

use tokio::time::Instant;

/// Single pending-scan slot shared by every trigger source.
///
/// A new request replaces whatever was pending (last caller wins), so at most one
/// scan is ever scheduled.
#[derive(Debug, Default)]
pub struct ScanScheduler {
    pending: Option<Instant>,
}

impl ScanScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, now: Instant, delay: Duration) {
        self.pending = Some(now + delay);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending
    }

    /// Consumes the pending scan if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(deadline) if deadline <= now => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}
