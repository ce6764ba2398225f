//! Baseline store: per-watch persisted file records.
//!
//! Each function issues a single statement; the check engine wraps every
//! mutation in its own `Database::with_transaction` call so each
//! create/update/delete is an individual atomic unit.

use rusqlite::Connection;

use super::models::FileRecord;
use crate::error::StorageError;
use crate::Result;

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        id: row.get(0)?,
        watch_id: row.get(1)?,
        filename: row.get(2)?,
        created: row.get(3)?,
        modified: row.get(4)?,
        uid: row.get(5)?,
        gid: row.get(6)?,
        mode: row.get(7)?,
        size: row.get(8)?,
    })
}

/// List all baseline records for a watch.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_for_watch(conn: &Connection, watch_id: i64) -> Result<Vec<FileRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, watch_id, filename, created, modified, uid, gid, mode, size
             FROM watch_files WHERE watch_id = ? ORDER BY filename",
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;

    let records = stmt
        .query_map([watch_id], row_to_record)
        .map_err(|e| StorageError::Database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| StorageError::Database(e.to_string()))?;

    Ok(records)
}

/// Create a new baseline record, returning it with its assigned id.
///
/// # Errors
///
/// Returns an error if the insert fails (e.g. duplicate filename within
/// the watch).
pub fn create(conn: &Connection, record: &FileRecord) -> Result<FileRecord> {
    conn.execute(
        "INSERT INTO watch_files
         (watch_id, filename, created, modified, uid, gid, mode, size)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            record.watch_id,
            record.filename,
            record.created,
            record.modified,
            record.uid,
            record.gid,
            record.mode,
            record.size
        ],
    )
    .map_err(|e| StorageError::Database(e.to_string()))?;

    let mut created = record.clone();
    created.id = Some(conn.last_insert_rowid());
    Ok(created)
}

/// Update a baseline record in place (all tracked attributes at once).
///
/// # Errors
///
/// Returns an error if the record has no id or the update fails.
pub fn update(conn: &Connection, record: &FileRecord) -> Result<()> {
    let Some(id) = record.id else {
        return Err(StorageError::Database("cannot update unsaved record".to_string()).into());
    };

    let affected = conn
        .execute(
            "UPDATE watch_files
             SET created = ?, modified = ?, uid = ?, gid = ?, mode = ?, size = ?
             WHERE id = ?",
            rusqlite::params![
                record.created,
                record.modified,
                record.uid,
                record.gid,
                record.mode,
                record.size,
                id
            ],
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;

    if affected == 0 {
        return Err(StorageError::not_found("file record", id.to_string()).into());
    }

    Ok(())
}

/// Delete a baseline record.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete(conn: &Connection, record_id: i64) -> Result<()> {
    conn.execute("DELETE FROM watch_files WHERE id = ?", [record_id])
        .map_err(|e| StorageError::Database(e.to_string()))?;
    Ok(())
}

/// Count baseline records for a watch.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_for_watch(conn: &Connection, watch_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM watch_files WHERE watch_id = ?",
        [watch_id],
        |row| row.get(0),
    )
    .map_err(|e| StorageError::Database(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{insert_watch, migrate, Database};

    fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(migrate).unwrap();
        let watch = db
            .with_conn(|conn| insert_watch(conn, "/data", true, "a@example.com"))
            .unwrap();
        (db, watch.id)
    }

    fn record(watch_id: i64, filename: &str) -> FileRecord {
        FileRecord {
            id: None,
            watch_id,
            filename: filename.to_string(),
            created: 100,
            modified: 200,
            uid: 1000,
            gid: 1000,
            mode: 0o100_644,
            size: 42,
        }
    }

    #[test]
    fn test_create_and_list() {
        let (db, watch_id) = setup();

        db.with_conn(|conn| {
            let created = create(conn, &record(watch_id, "/data/a.txt"))?;
            assert!(created.id.is_some());

            let records = list_for_watch(conn, watch_id)?;
            assert_eq!(records.len(), 1);
            assert_eq!(records[0], created);

            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_list_empty_watch() {
        let (db, watch_id) = setup();

        let records = db.with_conn(|conn| list_for_watch(conn, watch_id)).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_update_in_place() {
        let (db, watch_id) = setup();

        db.with_conn(|conn| {
            let mut created = create(conn, &record(watch_id, "/data/a.txt"))?;
            created.modified = 300;
            created.size = 43;
            update(conn, &created)?;

            let records = list_for_watch(conn, watch_id)?;
            assert_eq!(records[0].modified, 300);
            assert_eq!(records[0].size, 43);

            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_update_unsaved_record_fails() {
        let (db, watch_id) = setup();

        let result = db.with_conn(|conn| update(conn, &record(watch_id, "/data/a.txt")));
        assert!(result.is_err());
    }

    #[test]
    fn test_delete() {
        let (db, watch_id) = setup();

        db.with_conn(|conn| {
            let created = create(conn, &record(watch_id, "/data/a.txt"))?;
            delete(conn, created.id.unwrap())?;
            assert!(list_for_watch(conn, watch_id)?.is_empty());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_count_for_watch() {
        let (db, watch_id) = setup();

        db.with_conn(|conn| {
            assert_eq!(count_for_watch(conn, watch_id)?, 0);
            create(conn, &record(watch_id, "/data/a.txt"))?;
            create(conn, &record(watch_id, "/data/b.txt"))?;
            assert_eq!(count_for_watch(conn, watch_id)?, 2);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_records_are_scoped_per_watch() {
        let (db, watch_id) = setup();

        db.with_conn(|conn| {
            let other = insert_watch(conn, "/other", true, "b@example.com")?;
            create(conn, &record(watch_id, "/data/a.txt"))?;
            create(conn, &record(other.id, "/other/b.txt"))?;

            assert_eq!(list_for_watch(conn, watch_id)?.len(), 1);
            assert_eq!(list_for_watch(conn, other.id)?.len(), 1);

            Ok(())
        })
        .unwrap();
    }
}
