//! Per-file metadata snapshots.

use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// One file's observable attributes as captured from the filesystem at
/// scan time.
///
/// Timestamps are whole Unix seconds; sub-second churn within the same
/// second is not detected. A snapshot is never persisted directly, it is
/// only mapped into baseline record mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskSnapshot {
    /// Full path of the file.
    pub filename: String,

    /// Creation time (birth time where available, inode change time
    /// otherwise), Unix seconds.
    pub created: i64,

    /// Modification time, Unix seconds.
    pub modified: i64,

    /// Owner user id.
    pub uid: u32,

    /// Owner group id.
    pub gid: u32,

    /// Mode bits, including the file type bits.
    pub mode: u32,

    /// Size in bytes.
    pub size: i64,
}

impl DiskSnapshot {
    /// Build a snapshot from already-fetched metadata.
    #[must_use]
    pub fn from_metadata(path: &Path, md: &Metadata) -> Self {
        Self {
            filename: path.to_string_lossy().into_owned(),
            created: birth_or_ctime(md),
            modified: md.mtime(),
            uid: md.uid(),
            gid: md.gid(),
            mode: md.mode(),
            size: i64::try_from(md.size()).unwrap_or(i64::MAX),
        }
    }

    /// Stat a path (following symlinks) and build a snapshot for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be stat'ed.
    pub fn capture(path: &Path) -> std::io::Result<Self> {
        let md = std::fs::metadata(path)?;
        Ok(Self::from_metadata(path, &md))
    }
}

/// Birth time in Unix seconds, falling back to the inode change time on
/// filesystems that do not record it. Birth time keeps a pure `chmod`
/// from also reporting a create-time change.
fn birth_or_ctime(md: &Metadata) -> i64 {
    md.created()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or_else(|| md.ctime(), |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_capture_regular_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.txt");
        fs::write(&path, b"hello").unwrap();

        let snap = DiskSnapshot::capture(&path).unwrap();
        assert_eq!(snap.filename, path.to_string_lossy());
        assert_eq!(snap.size, 5);
        assert!(snap.modified > 0);
        assert!(snap.created > 0);
        // Regular file bit set in the mode.
        assert_eq!(snap.mode & 0o170_000, 0o100_000);
    }

    #[test]
    fn test_capture_missing_path() {
        let tmp = TempDir::new().unwrap();
        let result = DiskSnapshot::capture(&tmp.path().join("gone.txt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_snapshot_equality() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.txt");
        fs::write(&path, b"hello").unwrap();

        let one = DiskSnapshot::capture(&path).unwrap();
        let two = DiskSnapshot::capture(&path).unwrap();
        assert_eq!(one, two);
    }
}
