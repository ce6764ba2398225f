//! Notification dispatch.
//!
//! Formats a per-watch change report and hands it to a
//! `NotificationSink`. Actual delivery (SMTP or otherwise) lives behind
//! the sink trait and is wired up by the caller.

mod dispatcher;
mod report;
mod sink;

pub use dispatcher::dispatch;
pub use report::{render_html, subject, ReportContext};
pub use sink::{EmailMessage, LogSink, NotificationSink, RecordingSink};
