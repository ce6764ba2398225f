//! Watch configuration records.

use rusqlite::Connection;

use super::models::Watch;
use crate::error::StorageError;
use crate::Result;

/// Insert a new watch.
///
/// # Errors
///
/// Returns an error if the root is already watched or the insert fails.
pub fn insert_watch(
    conn: &Connection,
    root: &str,
    recursive: bool,
    notify: &str,
) -> Result<Watch> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    conn.execute(
        "INSERT INTO watches (root, recursive, notify, created_at) VALUES (?, ?, ?, ?)",
        rusqlite::params![root, recursive, notify, i64::try_from(now).unwrap_or_default()],
    )
    .map_err(|e| StorageError::Database(e.to_string()))?;

    Ok(Watch {
        id: conn.last_insert_rowid(),
        root: root.to_string(),
        recursive,
        notify: notify.to_string(),
    })
}

/// Get a watch by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_watch(conn: &Connection, id: i64) -> Result<Option<Watch>> {
    let result = conn.query_row(
        "SELECT id, root, recursive, notify FROM watches WHERE id = ?",
        [id],
        |row| {
            Ok(Watch {
                id: row.get(0)?,
                root: row.get(1)?,
                recursive: row.get(2)?,
                notify: row.get(3)?,
            })
        },
    );

    match result {
        Ok(watch) => Ok(Some(watch)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(StorageError::Database(e.to_string()).into()),
    }
}

/// List all watches, ordered by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_watches(conn: &Connection) -> Result<Vec<Watch>> {
    let mut stmt = conn
        .prepare("SELECT id, root, recursive, notify FROM watches ORDER BY id")
        .map_err(|e| StorageError::Database(e.to_string()))?;

    let watches = stmt
        .query_map([], |row| {
            Ok(Watch {
                id: row.get(0)?,
                root: row.get(1)?,
                recursive: row.get(2)?,
                notify: row.get(3)?,
            })
        })
        .map_err(|e| StorageError::Database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| StorageError::Database(e.to_string()))?;

    Ok(watches)
}

/// Delete a watch and (via cascade) its baseline records.
///
/// # Errors
///
/// Returns an error if the watch does not exist or the delete fails.
pub fn delete_watch(conn: &Connection, id: i64) -> Result<()> {
    let affected = conn
        .execute("DELETE FROM watches WHERE id = ?", [id])
        .map_err(|e| StorageError::Database(e.to_string()))?;

    if affected == 0 {
        return Err(StorageError::not_found("watch", id.to_string()).into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{migrate, Database};

    fn setup_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(migrate).unwrap();
        db
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();

        db.with_conn(|conn| {
            let watch = insert_watch(conn, "/etc", true, "root@example.com")?;
            assert!(watch.id > 0);

            let fetched = get_watch(conn, watch.id)?.unwrap();
            assert_eq!(fetched.root, "/etc");
            assert!(fetched.recursive);
            assert_eq!(fetched.notify, "root@example.com");

            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_get_nonexistent() {
        let db = setup_db();

        let result = db.with_conn(|conn| get_watch(conn, 999)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_duplicate_root_rejected() {
        let db = setup_db();

        db.with_conn(|conn| {
            insert_watch(conn, "/etc", true, "a@example.com")?;
            assert!(insert_watch(conn, "/etc", false, "b@example.com").is_err());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_list_watches() {
        let db = setup_db();

        db.with_conn(|conn| {
            insert_watch(conn, "/etc", true, "a@example.com")?;
            insert_watch(conn, "/var/log", false, "b@example.com")?;

            let watches = list_watches(conn)?;
            assert_eq!(watches.len(), 2);
            assert_eq!(watches[0].root, "/etc");
            assert_eq!(watches[1].root, "/var/log");
            assert!(!watches[1].recursive);

            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_delete_watch() {
        let db = setup_db();

        db.with_conn(|conn| {
            let watch = insert_watch(conn, "/etc", true, "a@example.com")?;
            delete_watch(conn, watch.id)?;
            assert!(get_watch(conn, watch.id)?.is_none());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_delete_missing_watch() {
        let db = setup_db();

        let result = db.with_conn(|conn| delete_watch(conn, 42));
        assert!(result.is_err());
    }
}
