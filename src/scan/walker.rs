//! Watch root enumeration.

use std::path::Path;

use walkdir::WalkDir;

use super::snapshot::DiskSnapshot;

/// Enumerate the regular files reachable from a watch root.
///
/// - A missing root yields an empty list; the caller reports it.
/// - A root that is itself a regular file yields exactly one snapshot,
///   regardless of `recursive`.
/// - A directory root is walked with `walkdir`; with `recursive` false
///   only immediate children are listed. Directories are never reported.
///   Symlinks are resolved by `stat`; broken links and entries that
///   vanish mid-walk are skipped with a warning.
///
/// Traversal order is unspecified; callers must not depend on it.
#[must_use]
pub fn walk(root: &Path, recursive: bool) -> Vec<DiskSnapshot> {
    let root_md = match std::fs::metadata(root) {
        Ok(md) => md,
        Err(e) => {
            tracing::debug!(root = %root.display(), error = %e, "Watch root not accessible");
            return Vec::new();
        }
    };

    if !root_md.is_dir() {
        return vec![DiskSnapshot::from_metadata(root, &root_md)];
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut snapshots = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(root = %root.display(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        match entry.metadata() {
            Ok(md) => snapshots.push(DiskSnapshot::from_metadata(entry.path(), &md)),
            Err(e) => {
                // Entry vanished between readdir and stat.
                tracing::warn!(path = %entry.path().display(), error = %e, "Skipping vanished entry");
            }
        }
    }

    snapshots
}
