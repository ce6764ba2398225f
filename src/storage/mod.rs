//! `SQLite` storage for watch definitions and file baselines.
//!
//! This module provides persistent storage for:
//! - Watch configuration records
//! - The per-watch baseline of last-known file metadata

pub mod baseline;
mod connection;
mod models;
mod schema;
mod watches;

pub use connection::Database;
pub use models::{FileRecord, Watch};
pub use schema::{migrate, verify_schema, SCHEMA_VERSION};
pub use watches::{delete_watch, get_watch, insert_watch, list_watches};

/// Initialize storage with migrations.
///
/// # Errors
///
/// Returns an error if database initialization fails.
pub fn init_storage(db: &Database) -> crate::Result<()> {
    db.with_conn(|conn| {
        migrate(conn)?;
        verify_schema(conn)?;

        tracing::info!("Storage initialized, schema version {SCHEMA_VERSION}");
        Ok(())
    })
}
