//! The check engine: scan, reconcile, report.
//!
//! One check run walks each selected watch root, reconciles the disk
//! snapshots against the baseline store, emits ordered progress events
//! throughout and dispatches notifications for watches with changes.

mod progress;
mod reconciler;
mod runner;

pub use progress::{FileStatus, ProgressEvent, ProgressSink};
pub use reconciler::{reconcile, ChangeEntry, ReconcileOutcome};
pub use runner::{run_check, run_check_stream, CheckOptions, CheckSummary, WatchReport};
