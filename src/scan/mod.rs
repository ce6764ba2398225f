//! Filesystem scanning.
//!
//! Walks a watch root and captures one metadata snapshot per regular
//! file. Content is never read; only `stat` data is observed.

mod snapshot;
mod walker;

pub use snapshot::DiskSnapshot;
pub use walker::walk;
