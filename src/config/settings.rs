//! Configuration settings and validation.

use crate::{Error, Result};
use std::path::PathBuf;

/// Main configuration for the filewatch service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for the `SQLite` database and other data.
    pub data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Sender address used for notification mails.
    pub from_address: String,

    /// Include the unchanged file list in reports.
    pub report_unchanged: bool,

    /// Swallow notification delivery failures instead of surfacing them.
    pub fail_silent: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            log_level: "info".to_string(),
            from_address: "filewatch@localhost".to_string(),
            report_unchanged: false,
            fail_silent: false,
        }
    }
}

impl Config {
    /// Create a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "invalid log level '{}', must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.from_address.is_empty() {
            return Err(Error::config("from_address cannot be empty"));
        }

        if !self.from_address.contains('@') {
            return Err(Error::config(format!(
                "from_address '{}' is not a mail address",
                self.from_address
            )));
        }

        Ok(())
    }

    /// Get the path to the `SQLite` database file.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("filewatch.db")
    }

    /// Derive the report configuration handed to the engine.
    #[must_use]
    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            from_address: self.from_address.clone(),
            report_unchanged: self.report_unchanged,
            fail_silent: self.fail_silent,
        }
    }
}

/// Report settings consumed by the check engine and dispatcher.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Sender address for notification mails.
    pub from_address: String,

    /// Include the unchanged file list in report bodies.
    pub report_unchanged: bool,

    /// Swallow delivery failures instead of surfacing them.
    pub fail_silent: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Config::default().report_config()
    }
}
