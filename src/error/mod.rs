//! Error types and Result aliases for filewatch.
//!
//! This module defines the error hierarchy used throughout the crate.
//! All public functions return `Result<T, Error>` or `Result<T>`.

use thiserror::Error;

/// Result type alias using the filewatch Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for filewatch operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database/storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Filesystem scan error.
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// Notification error.
    #[error("notification error: {0}")]
    Notify(#[from] NotifyError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// `SQLite` database error.
    #[error("database error: {0}")]
    Database(String),

    /// Record not found.
    #[error("not found: {entity} with id '{id}'")]
    NotFound { entity: &'static str, id: String },

    /// Schema migration error.
    #[error("migration error: {0}")]
    Migration(String),
}

/// Filesystem scan errors.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Failed to stat a path.
    #[error("failed to stat '{path}': {reason}")]
    StatFailed { path: String, reason: String },

    /// Failed to walk a directory.
    #[error("failed to walk '{path}': {reason}")]
    WalkFailed { path: String, reason: String },
}

/// Notification delivery errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Delivery to the sink failed.
    #[error("failed to deliver report for '{root}': {reason}")]
    DeliveryFailed { root: String, reason: String },

    /// No recipients configured for a watch.
    #[error("no recipients configured for '{root}'")]
    NoRecipients { root: String },
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl StorageError {
    /// Create a not-found error.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}
