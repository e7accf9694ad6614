pub mod ledger;
pub mod overlay;
pub mod reconciler;
pub mod scheduler;
pub mod surface;
pub mod watch_time;

pub use ledger::{ItemLedger, ItemState};
pub use overlay::{overlay_decision, OverlayDecision, OverlayToggle};
pub use reconciler::{Reconciler, ScanReport};
pub use scheduler::ScanScheduler;
pub use surface::Surface;
pub use watch_time::WatchTimeTracker;
