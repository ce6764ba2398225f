//! Typed progress events and the sink they are delivered to.
//!
//! A check run produces a strictly ordered, single-pass sequence of
//! events. Each event renders to one human-readable progress line via
//! `Display`, so a caller can stream text or inspect the typed values.

use std::fmt;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;

/// Classification of one file during comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Changed,
    Unchanged,
    Deleted,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Added => "added",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
            Self::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// One milestone in a check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Run start marker.
    Begin { watch_id: Option<i64> },

    /// About to walk a watch root.
    Scanning { root: String },

    /// The watch root does not exist.
    RootMissing { root: String },

    /// Number of files found on disk for a watch.
    DiskCount { root: String, count: usize },

    /// About to load the baseline for a watch.
    LoadingBaseline { root: String },

    /// Number of baseline records loaded for a watch.
    BaselineCount { root: String, count: usize },

    /// Comparison of one watch begins.
    CompareStart { root: String },

    /// One file was classified.
    File {
        root: String,
        path: String,
        status: FileStatus,
    },

    /// A baseline mutation for one file failed; the pass continues.
    PersistFailed {
        root: String,
        path: String,
        reason: String,
    },

    /// Comparison of one watch is done.
    CompareDone { root: String },

    /// Notifications are disabled for this run.
    NotifySkipped,

    /// About to hand a report to the notification sink.
    NotifySending { root: String, recipients: Vec<String> },

    /// The sink accepted the report.
    NotifySent { root: String, recipients: Vec<String> },

    /// The sink rejected the report; other watches continue.
    NotifyFailed { root: String, reason: String },

    /// Run completion marker.
    Complete { watch_id: Option<i64> },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Begin { watch_id: Some(id) } => write!(f, "begin: check watch {id}"),
            Self::Begin { watch_id: None } => write!(f, "begin: check all watches"),
            Self::Scanning { root } => write!(f, "disk: scanning {root} for files"),
            Self::RootMissing { root } => write!(f, "disk: {root} does not exist"),
            Self::DiskCount { root, count } => write!(f, "disk: {root} found {count} files"),
            Self::LoadingBaseline { root } => write!(f, "database: {root} loading records"),
            Self::BaselineCount { root, count } => {
                write!(f, "database: {root} loaded {count} records")
            }
            Self::CompareStart { root } => write!(f, "compare: {root} start"),
            Self::File { root, path, status } => {
                write!(f, "compare: {root}: file {path} {status}")
            }
            Self::PersistFailed { root, path, reason } => {
                write!(f, "compare: {root}: file {path} failed: {reason}")
            }
            Self::CompareDone { root } => write!(f, "compare: {root} done"),
            Self::NotifySkipped => write!(f, "notify: skipped"),
            Self::NotifySending { root, recipients } => {
                write!(f, "notify: about to send {root} to {}", recipients.join(";"))
            }
            Self::NotifySent { root, recipients } => {
                write!(f, "notify: {root} sent to {}", recipients.join(";"))
            }
            Self::NotifyFailed { root, reason } => {
                write!(f, "notify: {root} failed: {reason}")
            }
            Self::Complete { watch_id: Some(id) } => write!(f, "complete: check watch {id}"),
            Self::Complete { watch_id: None } => write!(f, "complete: check all watches"),
        }
    }
}

/// Destination for progress events.
///
/// The channel variant feeds an incremental consumer; delivery uses
/// `blocking_send`, so the producer must run outside the async runtime
/// (the runner uses `spawn_blocking`). A consumer that drops its end
/// does not abort the pass: committed baseline mutations stand and the
/// remaining events are discarded.
#[derive(Debug)]
pub enum ProgressSink {
    /// Hand events to an incremental consumer.
    Channel(mpsc::Sender<ProgressEvent>),
    /// Buffer events for later inspection.
    Collect(Mutex<Vec<ProgressEvent>>),
    /// Drop events.
    Discard,
}

impl ProgressSink {
    /// Create a collecting sink.
    #[must_use]
    pub fn collect() -> Self {
        Self::Collect(Mutex::new(Vec::new()))
    }

    /// Deliver one event. Never fails; an abandoned consumer is logged
    /// and ignored.
    pub fn emit(&self, event: ProgressEvent) {
        match self {
            Self::Channel(tx) => {
                if tx.blocking_send(event).is_err() {
                    tracing::debug!("Progress consumer gone, discarding event");
                }
            }
            Self::Collect(buf) => buf.lock().push(event),
            Self::Discard => {}
        }
    }

    /// Consume a collecting sink and return the buffered events.
    /// Other variants return an empty list.
    #[must_use]
    pub fn into_collected(self) -> Vec<ProgressEvent> {
        match self {
            Self::Collect(buf) => buf.into_inner(),
            _ => Vec::new(),
        }
    }
}
