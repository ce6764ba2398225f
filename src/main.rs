//! Filewatch - baseline file change detection
//!
//! Entry point for the filewatch CLI.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_stream::StreamExt;

use filewatch::check::{run_check_stream, CheckOptions};
use filewatch::notify::{LogSink, NotificationSink};
use filewatch::observability::init_tracing;
use filewatch::storage::{delete_watch, init_storage, insert_watch, list_watches, Database};
use filewatch::{Config, Error, Result};

/// Filewatch - baseline file change detection
#[derive(Parser, Debug)]
#[command(name = "filewatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Data directory for the `SQLite` database
    #[arg(short, long, env = "FILEWATCH_DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "FILEWATCH_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, env = "FILEWATCH_LOG_JSON")]
    log_json: bool,

    /// Sender address for notification mails
    #[arg(long, env = "FILEWATCH_FROM", default_value = "filewatch@localhost")]
    from_address: String,

    /// Include the unchanged file list in reports
    #[arg(long, env = "FILEWATCH_REPORT_UNCHANGED")]
    report_unchanged: bool,

    /// Swallow notification delivery failures
    #[arg(long, env = "FILEWATCH_FAIL_SILENT")]
    fail_silent: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a watch for a file or directory
    Add {
        /// Full path of the file or directory to watch
        root: PathBuf,

        /// Do not descend into subdirectories
        #[arg(long)]
        non_recursive: bool,

        /// Notification address(es), separated by ';'
        #[arg(long)]
        notify: String,
    },

    /// List configured watches
    List,

    /// Remove a watch and its baseline
    Remove {
        /// Watch id
        id: i64,
    },

    /// Run a check against the baseline
    Check {
        /// Check a single watch instead of all watches
        #[arg(long)]
        watch_id: Option<i64>,

        /// Include the unchanged file list in the summary
        #[arg(long)]
        verbose: bool,

        /// Do not dispatch notifications
        #[arg(long)]
        no_notify: bool,
    },
}

fn to_json(value: &impl serde::Serialize) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::internal(e.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.log_json);

    let config = Config {
        data_dir: cli.data_dir,
        log_level: cli.log_level,
        from_address: cli.from_address,
        report_unchanged: cli.report_unchanged,
        fail_silent: cli.fail_silent,
    };
    config.validate()?;

    tracing::debug!(?config, "Configuration loaded");

    let db = Database::open(config.database_path())?;
    init_storage(&db)?;

    match cli.command {
        Command::Add {
            root,
            non_recursive,
            notify,
        } => {
            let watch = db.with_conn(|conn| {
                insert_watch(conn, &root.to_string_lossy(), !non_recursive, &notify)
            })?;
            tracing::info!(id = watch.id, root = %watch.root, "Watch added");
            println!("{}", to_json(&watch)?);
        }
        Command::List => {
            let watches = db.with_conn(list_watches)?;
            println!("{}", to_json(&watches)?);
        }
        Command::Remove { id } => {
            db.with_conn(|conn| delete_watch(conn, id))?;
            tracing::info!(id, "Watch removed");
        }
        Command::Check {
            watch_id,
            verbose,
            no_notify,
        } => {
            let opts = CheckOptions {
                watch_id,
                verbose,
                notify_enabled: !no_notify,
            };
            let sink: Arc<dyn NotificationSink> = Arc::new(LogSink);

            let (mut stream, handle) =
                run_check_stream(db, config.report_config(), opts, sink);
            while let Some(event) = stream.next().await {
                println!("{event}");
            }

            let summary = handle
                .await
                .map_err(|e| Error::internal(format!("check task failed: {e}")))??;
            println!("{}", to_json(&summary)?);
        }
    }

    Ok(())
}
