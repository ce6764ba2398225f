//! Filewatch
//!
//! Detects changes to files on disk relative to a persisted metadata
//! baseline and reports the differences. One check run walks each
//! configured watch root, reconciles the observed snapshots against the
//! baseline store, streams progress lines, and dispatches a change
//! report per watch to a notification sink.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod check;
pub mod config;
pub mod error;
pub mod notify;
pub mod observability;
pub mod scan;
pub mod storage;

pub use config::{Config, ReportConfig};
pub use error::{Error, Result};
