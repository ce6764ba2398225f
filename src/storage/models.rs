//! Data models for storage operations.

use serde::{Deserialize, Serialize};

use crate::scan::DiskSnapshot;

/// A configured watch: a filesystem root to monitor.
///
/// Watches are immutable during a check run. The root path is unique
/// across watches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Watch {
    /// Database primary key.
    pub id: i64,

    /// Full path of the file or directory to watch.
    pub root: String,

    /// Check for files inside the given directory.
    pub recursive: bool,

    /// Notification address(es); multiple addresses separated by `;`.
    pub notify: String,
}

impl Watch {
    /// Derive the recipient list from the notify field.
    ///
    /// A `;`-separated value is split; otherwise the whole value is the
    /// single recipient.
    #[must_use]
    pub fn recipients(&self) -> Vec<String> {
        if self.notify.contains(';') {
            self.notify
                .split(';')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        } else {
            vec![self.notify.clone()]
        }
    }
}

/// The persisted last-known metadata for one tracked file.
///
/// Created when a file is first observed, updated in place when any
/// tracked attribute differs from disk, deleted when the file is gone.
/// The reconciler is the only writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Database primary key, `None` until created.
    pub id: Option<i64>,

    /// Owning watch.
    pub watch_id: i64,

    /// Full path of the tracked file, unique within a watch.
    pub filename: String,

    /// Creation time, Unix seconds.
    pub created: i64,

    /// Modification time, Unix seconds.
    pub modified: i64,

    /// Owner user id.
    pub uid: u32,

    /// Owner group id.
    pub gid: u32,

    /// Mode bits.
    pub mode: u32,

    /// Size in bytes.
    pub size: i64,
}

impl FileRecord {
    /// Build a new record from a disk snapshot.
    #[must_use]
    pub fn from_snapshot(watch_id: i64, snapshot: &DiskSnapshot) -> Self {
        Self {
            id: None,
            watch_id,
            filename: snapshot.filename.clone(),
            created: snapshot.created,
            modified: snapshot.modified,
            uid: snapshot.uid,
            gid: snapshot.gid,
            mode: snapshot.mode,
            size: snapshot.size,
        }
    }

    /// Overwrite the tracked attributes with a snapshot's values.
    pub fn apply_snapshot(&mut self, snapshot: &DiskSnapshot) {
        self.created = snapshot.created;
        self.modified = snapshot.modified;
        self.uid = snapshot.uid;
        self.gid = snapshot.gid;
        self.mode = snapshot.mode;
        self.size = snapshot.size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> DiskSnapshot {
        DiskSnapshot {
            filename: "/data/a.txt".to_string(),
            created: 100,
            modified: 200,
            uid: 1000,
            gid: 1000,
            mode: 0o100_644,
            size: 42,
        }
    }

    #[test]
    fn test_recipients_single() {
        let watch = Watch {
            id: 1,
            root: "/data".to_string(),
            recursive: true,
            notify: "admin@example.com".to_string(),
        };
        assert_eq!(watch.recipients(), vec!["admin@example.com"]);
    }

    #[test]
    fn test_recipients_split_on_semicolon() {
        let watch = Watch {
            id: 1,
            root: "/data".to_string(),
            recursive: true,
            notify: "a@example.com; b@example.com".to_string(),
        };
        assert_eq!(watch.recipients(), vec!["a@example.com", "b@example.com"]);
    }

    #[test]
    fn test_recipients_ignores_empty_segments() {
        let watch = Watch {
            id: 1,
            root: "/data".to_string(),
            recursive: true,
            notify: "a@example.com;;".to_string(),
        };
        assert_eq!(watch.recipients(), vec!["a@example.com"]);
    }

    #[test]
    fn test_record_from_snapshot() {
        let record = FileRecord::from_snapshot(7, &snapshot());

        assert!(record.id.is_none());
        assert_eq!(record.watch_id, 7);
        assert_eq!(record.filename, "/data/a.txt");
        assert_eq!(record.created, 100);
        assert_eq!(record.modified, 200);
        assert_eq!(record.uid, 1000);
        assert_eq!(record.gid, 1000);
        assert_eq!(record.mode, 0o100_644);
        assert_eq!(record.size, 42);
    }

    #[test]
    fn test_apply_snapshot_overwrites_attributes() {
        let mut record = FileRecord::from_snapshot(7, &snapshot());
        record.id = Some(3);

        let newer = DiskSnapshot {
            modified: 300,
            size: 43,
            ..snapshot()
        };
        record.apply_snapshot(&newer);

        assert_eq!(record.id, Some(3));
        assert_eq!(record.modified, 300);
        assert_eq!(record.size, 43);
        assert_eq!(record.filename, "/data/a.txt");
    }
}
