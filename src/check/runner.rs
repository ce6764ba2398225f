//! The check run: trigger surface of the engine.
//!
//! `run_check` executes one reconciliation pass synchronously, feeding a
//! `ProgressSink`; `run_check_stream` wraps it for incremental async
//! consumption. A run is single-pass and not restartable.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::progress::{ProgressEvent, ProgressSink};
use super::reconciler::{reconcile, ChangeEntry};
use crate::config::ReportConfig;
use crate::notify::{dispatch, NotificationSink};
use crate::scan;
use crate::storage::{self, baseline, Database, Watch};
use crate::Result;

/// Typed run options, validated once at the boundary.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Check a single watch, or all watches when `None`.
    pub watch_id: Option<i64>,

    /// Collect the unchanged file list into the summary and report.
    pub verbose: bool,

    /// Dispatch notifications for watches with changes.
    pub notify_enabled: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            watch_id: None,
            verbose: false,
            notify_enabled: true,
        }
    }
}

/// Per-watch result of a check run.
#[derive(Debug, Clone, Serialize)]
pub struct WatchReport {
    /// The watch this report covers.
    pub watch: Watch,

    /// Added/changed/deleted files with their change descriptions.
    pub changed: Vec<ChangeEntry>,

    /// Unchanged files (filename only). Collected only when the run or
    /// report configuration requests it; the count is always kept.
    pub unchanged: Vec<ChangeEntry>,

    /// Total files considered (changed + unchanged).
    pub num_files: usize,

    /// Number of changed files.
    pub num_changed: usize,

    /// Number of unchanged files.
    pub num_unchanged: usize,

    /// Baseline mutations that failed for this watch.
    pub persist_failures: u64,

    /// Whether a notification was handed to the sink.
    pub notified: bool,
}

/// Final structured result of a check run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckSummary {
    /// One report per checked watch.
    pub reports: Vec<WatchReport>,

    /// Baseline mutations that failed across all watches.
    pub persist_failures: u64,

    /// Notification deliveries that failed (and were surfaced).
    pub notify_failed: u64,
}

/// Resolve the watches covered by this run.
///
/// An unknown watch id resolves to an empty list, not an error.
fn resolve_watches(db: &Database, watch_id: Option<i64>) -> Result<Vec<Watch>> {
    match watch_id {
        Some(id) => {
            let watch = db.with_conn(|conn| storage::get_watch(conn, id))?;
            if watch.is_none() {
                tracing::warn!(watch_id = id, "Unknown watch id, nothing to check");
            }
            Ok(watch.into_iter().collect())
        }
        None => db.with_conn(storage::list_watches),
    }
}

/// Execute one check run.
///
/// Watches are processed sequentially; within a watch the walk completes
/// before comparison begins. Progress events are emitted in the order
/// required of the stream; the returned summary carries the accumulated
/// per-watch results.
///
/// # Errors
///
/// Returns an error only for run-level failures (database unavailable,
/// broken configuration). Per-file and per-watch problems are converted
/// into progress events and counters.
pub fn run_check(
    db: &Database,
    config: &ReportConfig,
    opts: &CheckOptions,
    sink: &dyn NotificationSink,
    progress: &ProgressSink,
) -> Result<CheckSummary> {
    progress.emit(ProgressEvent::Begin {
        watch_id: opts.watch_id,
    });

    let watches = resolve_watches(db, opts.watch_id)?;
    let mut summary = CheckSummary::default();
    let collect_unchanged = opts.verbose || config.report_unchanged;

    for watch in watches {
        let root = Path::new(&watch.root);

        let disk = if root.exists() {
            progress.emit(ProgressEvent::Scanning {
                root: watch.root.clone(),
            });
            scan::walk(root, watch.recursive)
        } else {
            progress.emit(ProgressEvent::RootMissing {
                root: watch.root.clone(),
            });
            Vec::new()
        };
        progress.emit(ProgressEvent::DiskCount {
            root: watch.root.clone(),
            count: disk.len(),
        });

        progress.emit(ProgressEvent::LoadingBaseline {
            root: watch.root.clone(),
        });
        let stored = db.with_conn(|conn| baseline::list_for_watch(conn, watch.id))?;
        progress.emit(ProgressEvent::BaselineCount {
            root: watch.root.clone(),
            count: stored.len(),
        });

        progress.emit(ProgressEvent::CompareStart {
            root: watch.root.clone(),
        });
        let outcome = reconcile(db, &watch, &disk, &stored, progress);
        progress.emit(ProgressEvent::CompareDone {
            root: watch.root.clone(),
        });

        let num_changed = outcome.changed.len();
        let num_unchanged = outcome.unchanged.len();
        summary.persist_failures += outcome.persist_failures;
        summary.reports.push(WatchReport {
            watch,
            changed: outcome.changed,
            unchanged: if collect_unchanged {
                outcome.unchanged
            } else {
                Vec::new()
            },
            num_files: num_changed + num_unchanged,
            num_changed,
            num_unchanged,
            persist_failures: outcome.persist_failures,
            notified: false,
        });
    }

    if opts.notify_enabled {
        for report in &mut summary.reports {
            if report.num_changed == 0 {
                continue;
            }
            let recipients = report.watch.recipients();
            progress.emit(ProgressEvent::NotifySending {
                root: report.watch.root.clone(),
                recipients: recipients.clone(),
            });
            match dispatch(report, config, sink) {
                Ok(sent) => {
                    report.notified = sent;
                    if sent {
                        progress.emit(ProgressEvent::NotifySent {
                            root: report.watch.root.clone(),
                            recipients,
                        });
                    }
                }
                Err(e) => {
                    tracing::error!(
                        root = %report.watch.root,
                        error = %e,
                        "Notification delivery failed"
                    );
                    progress.emit(ProgressEvent::NotifyFailed {
                        root: report.watch.root.clone(),
                        reason: e.to_string(),
                    });
                    summary.notify_failed += 1;
                }
            }
        }
    } else {
        progress.emit(ProgressEvent::NotifySkipped);
    }

    progress.emit(ProgressEvent::Complete {
        watch_id: opts.watch_id,
    });

    Ok(summary)
}

/// Run a check on a blocking worker, streaming progress events.
///
/// Returns the event stream and a handle resolving to the summary. The
/// caller may abandon the stream early; mutations committed up to that
/// point remain valid and the run finishes in the background.
#[must_use]
pub fn run_check_stream(
    db: Database,
    config: ReportConfig,
    opts: CheckOptions,
    sink: Arc<dyn NotificationSink>,
) -> (
    ReceiverStream<ProgressEvent>,
    tokio::task::JoinHandle<Result<CheckSummary>>,
) {
    let (tx, rx) = mpsc::channel(64);

    let handle = tokio::task::spawn_blocking(move || {
        let progress = ProgressSink::Channel(tx);
        run_check(&db, &config, &opts, sink.as_ref(), &progress)
    });

    (ReceiverStream::new(rx), handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingSink;
    use crate::storage::{init_storage, insert_watch};
    use std::fs;
    use tempfile::TempDir;

    fn setup_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        init_storage(&db).unwrap();
        db
    }

    #[test]
    fn test_unknown_watch_id_yields_empty_summary() {
        let db = setup_db();
        let sink = RecordingSink::default();
        let progress = ProgressSink::collect();

        let opts = CheckOptions {
            watch_id: Some(999),
            ..Default::default()
        };
        let summary =
            run_check(&db, &ReportConfig::default(), &opts, &sink, &progress).unwrap();

        assert!(summary.reports.is_empty());
        let events = progress.into_collected();
        assert_eq!(events.first(), Some(&ProgressEvent::Begin { watch_id: Some(999) }));
        assert_eq!(
            events.last(),
            Some(&ProgressEvent::Complete { watch_id: Some(999) })
        );
    }

    #[test]
    fn test_missing_root_is_reported_not_fatal() {
        let db = setup_db();
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        db.with_conn(|conn| {
            insert_watch(conn, &missing.to_string_lossy(), true, "a@example.com")
        })
        .unwrap();

        let sink = RecordingSink::default();
        let progress = ProgressSink::collect();
        let summary = run_check(
            &db,
            &ReportConfig::default(),
            &CheckOptions::default(),
            &sink,
            &progress,
        )
        .unwrap();

        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.reports[0].num_files, 0);

        let events = progress.into_collected();
        assert!(events.contains(&ProgressEvent::RootMissing {
            root: missing.to_string_lossy().into_owned()
        }));
    }

    #[test]
    fn test_first_run_reports_additions_and_notifies() {
        let db = setup_db();
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), b"a").unwrap();

        db.with_conn(|conn| {
            insert_watch(conn, &tmp.path().to_string_lossy(), true, "a@example.com")
        })
        .unwrap();

        let sink = RecordingSink::default();
        let summary = run_check(
            &db,
            &ReportConfig::default(),
            &CheckOptions::default(),
            &sink,
            &ProgressSink::Discard,
        )
        .unwrap();

        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.reports[0].num_changed, 1);
        assert!(summary.reports[0].notified);
        assert_eq!(sink.messages().len(), 1);
    }

    #[test]
    fn test_notifications_disabled_emits_skip_marker() {
        let db = setup_db();
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), b"a").unwrap();
        db.with_conn(|conn| {
            insert_watch(conn, &tmp.path().to_string_lossy(), true, "a@example.com")
        })
        .unwrap();

        let sink = RecordingSink::default();
        let progress = ProgressSink::collect();
        let opts = CheckOptions {
            notify_enabled: false,
            ..Default::default()
        };
        let summary =
            run_check(&db, &ReportConfig::default(), &opts, &sink, &progress).unwrap();

        assert!(!summary.reports[0].notified);
        assert!(sink.messages().is_empty());
        assert!(progress
            .into_collected()
            .contains(&ProgressEvent::NotifySkipped));
    }

    #[test]
    fn test_verbose_collects_unchanged_entries() {
        let db = setup_db();
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), b"a").unwrap();
        db.with_conn(|conn| {
            insert_watch(conn, &tmp.path().to_string_lossy(), true, "a@example.com")
        })
        .unwrap();

        let sink = RecordingSink::default();
        run_check(
            &db,
            &ReportConfig::default(),
            &CheckOptions::default(),
            &sink,
            &ProgressSink::Discard,
        )
        .unwrap();

        // Second run, nothing changed on disk.
        for verbose in [false, true] {
            let opts = CheckOptions {
                verbose,
                ..Default::default()
            };
            let summary = run_check(
                &db,
                &ReportConfig::default(),
                &opts,
                &sink,
                &ProgressSink::Discard,
            )
            .unwrap();

            let report = &summary.reports[0];
            assert_eq!(report.num_unchanged, 1);
            assert_eq!(report.unchanged.len(), usize::from(verbose));
        }
    }

    #[tokio::test]
    async fn test_run_check_stream_delivers_events_and_summary() {
        use tokio_stream::StreamExt;

        let db = setup_db();
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), b"a").unwrap();
        db.with_conn(|conn| {
            insert_watch(conn, &tmp.path().to_string_lossy(), true, "a@example.com")
        })
        .unwrap();

        let (mut stream, handle) = run_check_stream(
            db,
            ReportConfig::default(),
            CheckOptions::default(),
            Arc::new(RecordingSink::default()),
        );

        let mut events = Vec::new();
        while let Some(event) = stream.next().await {
            events.push(event);
        }
        let summary = handle.await.unwrap().unwrap();

        assert_eq!(events.first(), Some(&ProgressEvent::Begin { watch_id: None }));
        assert_eq!(
            events.last(),
            Some(&ProgressEvent::Complete { watch_id: None })
        );
        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.reports[0].num_changed, 1);
    }

    #[tokio::test]
    async fn test_abandoned_stream_still_commits_baseline() {
        let db = setup_db();
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), b"a").unwrap();
        let watch = db
            .with_conn(|conn| {
                insert_watch(conn, &tmp.path().to_string_lossy(), true, "a@example.com")
            })
            .unwrap();

        let (stream, handle) = run_check_stream(
            db.clone(),
            ReportConfig::default(),
            CheckOptions::default(),
            Arc::new(RecordingSink::default()),
        );
        drop(stream);

        let summary = handle.await.unwrap().unwrap();
        assert_eq!(summary.reports[0].num_changed, 1);

        let count = db
            .with_conn(|conn| baseline::count_for_watch(conn, watch.id))
            .unwrap();
        assert_eq!(count, 1);
    }
}
