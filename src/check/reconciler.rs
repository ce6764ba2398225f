//! Baseline reconciliation.
//!
//! Compares one watch's disk snapshots against its stored baseline,
//! classifies every file as added/changed/unchanged/deleted, and
//! persists the updated baseline. Each record mutation is its own
//! transaction; a failure for one file is reported and counted but
//! never stops the pass.

use std::collections::HashMap;

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use super::progress::{FileStatus, ProgressEvent, ProgressSink};
use crate::scan::DiskSnapshot;
use crate::storage::{baseline, Database, FileRecord, Watch};

/// A filename paired with zero or more human-readable change
/// descriptions. An empty description list marks an unchanged file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub filename: String,
    pub changes: Vec<String>,
}

impl ChangeEntry {
    fn unchanged(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            changes: Vec::new(),
        }
    }
}

/// Result of one reconciliation pass over a single watch.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    /// Added, changed and deleted files, with their descriptions.
    pub changed: Vec<ChangeEntry>,

    /// Files whose tracked attributes all matched the baseline.
    pub unchanged: Vec<ChangeEntry>,

    /// Baseline mutations that failed and were skipped.
    pub persist_failures: u64,
}

/// Format a Unix timestamp as local time for change descriptions.
fn format_local_time(ts: i64) -> String {
    Local
        .timestamp_opt(ts, 0)
        .single()
        .map_or_else(|| ts.to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Compare a stored record against a disk snapshot.
///
/// Descriptions come back in a fixed attribute order (created, modified,
/// uid, gid, mode, size) so output is reproducible regardless of how
/// the differences were detected.
fn diff_record(stored: &FileRecord, disk: &DiskSnapshot) -> Vec<String> {
    let mut changes = Vec::new();

    if disk.created != stored.created {
        changes.push(format!(
            "Create time changed from {} to {}",
            format_local_time(stored.created),
            format_local_time(disk.created)
        ));
    }
    if disk.modified != stored.modified {
        changes.push(format!(
            "Modification time changed from {} to {}",
            format_local_time(stored.modified),
            format_local_time(disk.modified)
        ));
    }
    if disk.uid != stored.uid {
        changes.push(format!("Owner changed from {} to {}", stored.uid, disk.uid));
    }
    if disk.gid != stored.gid {
        changes.push(format!("Group changed from {} to {}", stored.gid, disk.gid));
    }
    if disk.mode != stored.mode {
        changes.push(format!(
            "Mode changed from {:o} to {:o}",
            stored.mode, disk.mode
        ));
    }
    if disk.size != stored.size {
        changes.push(format!(
            "Size changed from {:o} to {:o}",
            stored.size, disk.size
        ));
    }

    changes
}

/// Reconcile one watch's disk snapshots against its stored baseline.
///
/// Side effect: mutates the baseline store so that afterwards the set of
/// stored filenames equals the set of filenames observed on disk (except
/// for isolated persistence failures, which are counted).
pub fn reconcile(
    db: &Database,
    watch: &Watch,
    disk: &[DiskSnapshot],
    stored: &[FileRecord],
    progress: &ProgressSink,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();

    // Expect every stored record to be missing until seen on disk.
    let by_name: HashMap<&str, usize> = stored
        .iter()
        .enumerate()
        .map(|(i, r)| (r.filename.as_str(), i))
        .collect();
    let mut seen = vec![false; stored.len()];

    for snapshot in disk {
        match by_name.get(snapshot.filename.as_str()) {
            None => {
                // File added
                let record = FileRecord::from_snapshot(watch.id, snapshot);
                match db.with_transaction(|conn| baseline::create(conn, &record)) {
                    Ok(_) => {
                        progress.emit(ProgressEvent::File {
                            root: watch.root.clone(),
                            path: snapshot.filename.clone(),
                            status: FileStatus::Added,
                        });
                        outcome.changed.push(ChangeEntry {
                            filename: snapshot.filename.clone(),
                            changes: vec!["File added".to_string()],
                        });
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %snapshot.filename,
                            error = %e,
                            "Failed to create baseline record"
                        );
                        progress.emit(ProgressEvent::PersistFailed {
                            root: watch.root.clone(),
                            path: snapshot.filename.clone(),
                            reason: e.to_string(),
                        });
                        outcome.persist_failures += 1;
                    }
                }
            }
            Some(&i) => {
                seen[i] = true;
                let record = &stored[i];
                let changes = diff_record(record, snapshot);

                if changes.is_empty() {
                    progress.emit(ProgressEvent::File {
                        root: watch.root.clone(),
                        path: snapshot.filename.clone(),
                        status: FileStatus::Unchanged,
                    });
                    outcome
                        .unchanged
                        .push(ChangeEntry::unchanged(&snapshot.filename));
                    continue;
                }

                let mut updated = record.clone();
                updated.apply_snapshot(snapshot);
                match db.with_transaction(|conn| baseline::update(conn, &updated)) {
                    Ok(()) => {
                        progress.emit(ProgressEvent::File {
                            root: watch.root.clone(),
                            path: snapshot.filename.clone(),
                            status: FileStatus::Changed,
                        });
                        outcome.changed.push(ChangeEntry {
                            filename: snapshot.filename.clone(),
                            changes,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %snapshot.filename,
                            error = %e,
                            "Failed to update baseline record"
                        );
                        progress.emit(ProgressEvent::PersistFailed {
                            root: watch.root.clone(),
                            path: snapshot.filename.clone(),
                            reason: e.to_string(),
                        });
                        outcome.persist_failures += 1;
                    }
                }
            }
        }
    }

    // Whatever was not seen on disk has been deleted.
    for (i, record) in stored.iter().enumerate() {
        if seen[i] {
            continue;
        }
        let Some(id) = record.id else {
            continue;
        };
        match db.with_transaction(|conn| baseline::delete(conn, id)) {
            Ok(()) => {
                progress.emit(ProgressEvent::File {
                    root: watch.root.clone(),
                    path: record.filename.clone(),
                    status: FileStatus::Deleted,
                });
                outcome.changed.push(ChangeEntry {
                    filename: record.filename.clone(),
                    changes: vec!["File deleted".to_string()],
                });
            }
            Err(e) => {
                tracing::warn!(
                    path = %record.filename,
                    error = %e,
                    "Failed to delete baseline record"
                );
                progress.emit(ProgressEvent::PersistFailed {
                    root: watch.root.clone(),
                    path: record.filename.clone(),
                    reason: e.to_string(),
                });
                outcome.persist_failures += 1;
            }
        }
    }

    outcome
}
