//! Configuration for the filewatch engine.

mod settings;

pub use settings::{Config, ReportConfig};
