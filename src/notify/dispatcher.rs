//! Per-watch notification dispatch.

use super::report::{render_html, subject, ReportContext};
use super::sink::{EmailMessage, NotificationSink};
use crate::check::WatchReport;
use crate::config::ReportConfig;
use crate::error::NotifyError;
use crate::Result;

/// Format and deliver the notification for one watch report.
///
/// Returns `Ok(false)` without touching the sink when the changed list
/// is empty. With `fail_silent` set, a delivery error is logged and the
/// dispatch reports the attempt as made.
///
/// # Errors
///
/// Returns an error if the watch has no usable recipients or delivery
/// fails (and `fail_silent` is not set).
pub fn dispatch(
    report: &WatchReport,
    config: &ReportConfig,
    sink: &dyn NotificationSink,
) -> Result<bool> {
    if report.num_changed == 0 {
        return Ok(false);
    }

    let recipients: Vec<String> = report
        .watch
        .recipients()
        .into_iter()
        .filter(|r| !r.is_empty())
        .collect();
    if recipients.is_empty() {
        return Err(NotifyError::NoRecipients {
            root: report.watch.root.clone(),
        }
        .into());
    }

    let ctx = ReportContext {
        root: &report.watch.root,
        num_files: report.num_files,
        num_changed: report.num_changed,
        num_unchanged: report.num_unchanged,
        changed: &report.changed,
        unchanged: &report.unchanged,
    };
    let message = EmailMessage {
        subject: subject(&ctx),
        from: config.from_address.clone(),
        recipients,
        html_body: render_html(&ctx, config.report_unchanged),
    };

    match sink.send(&message) {
        Ok(()) => Ok(true),
        Err(e) if config.fail_silent => {
            tracing::warn!(
                root = %report.watch.root,
                error = %e,
                "Notification delivery failed (fail-silent)"
            );
            Ok(true)
        }
        Err(e) => Err(NotifyError::DeliveryFailed {
            root: report.watch.root.clone(),
            reason: e.to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::ChangeEntry;
    use crate::notify::RecordingSink;
    use crate::storage::Watch;
    use crate::Error;

    struct FailingSink;

    impl NotificationSink for FailingSink {
        fn send(&self, _message: &EmailMessage) -> Result<()> {
            Err(Error::internal("sink unavailable"))
        }
    }

    fn watch(notify: &str) -> Watch {
        Watch {
            id: 1,
            root: "/data".to_string(),
            recursive: true,
            notify: notify.to_string(),
        }
    }

    fn report(notify: &str, num_changed: usize) -> WatchReport {
        let changed: Vec<ChangeEntry> = (0..num_changed)
            .map(|i| ChangeEntry {
                filename: format!("/data/{i}.txt"),
                changes: vec!["File added".to_string()],
            })
            .collect();
        WatchReport {
            watch: watch(notify),
            num_files: changed.len(),
            num_changed: changed.len(),
            num_unchanged: 0,
            changed,
            unchanged: Vec::new(),
            persist_failures: 0,
            notified: false,
        }
    }

    #[test]
    fn test_empty_changed_list_is_suppressed() {
        let sink = RecordingSink::default();
        let sent = dispatch(&report("a@example.com", 0), &ReportConfig::default(), &sink).unwrap();

        assert!(!sent);
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn test_dispatch_builds_message() {
        let sink = RecordingSink::default();
        let config = ReportConfig {
            from_address: "watch@example.com".to_string(),
            ..Default::default()
        };
        let sent = dispatch(&report("a@example.com;b@example.com", 2), &config, &sink).unwrap();

        assert!(sent);
        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].from, "watch@example.com");
        assert_eq!(messages[0].recipients, vec!["a@example.com", "b@example.com"]);
        assert!(messages[0].subject.contains("2 of 2 files changed"));
        assert!(messages[0].html_body.contains("/data/0.txt"));
    }

    #[test]
    fn test_no_recipients_is_an_error() {
        let sink = RecordingSink::default();
        let result = dispatch(&report("", 1), &ReportConfig::default(), &sink);

        assert!(result.is_err());
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn test_delivery_failure_is_surfaced() {
        let result = dispatch(
            &report("a@example.com", 1),
            &ReportConfig::default(),
            &FailingSink,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_fail_silent_swallows_delivery_failure() {
        let config = ReportConfig {
            fail_silent: true,
            ..Default::default()
        };
        let sent = dispatch(&report("a@example.com", 1), &config, &FailingSink).unwrap();
        assert!(sent);
    }
}
