//! The notification sink seam.

use parking_lot::Mutex;
use serde::Serialize;

use crate::Result;

/// A fully rendered notification, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    /// Subject line.
    pub subject: String,

    /// Sender address.
    pub from: String,

    /// Recipient addresses.
    pub recipients: Vec<String>,

    /// HTML report body.
    pub html_body: String,
}

/// Delivery seam for notifications.
///
/// Implementations deliver the message (SMTP, webhook, ...); the engine
/// only cares about success or failure.
pub trait NotificationSink: Send + Sync {
    /// Deliver one message.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails.
    fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Sink that logs instead of delivering. Used by the CLI when no real
/// delivery backend is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        tracing::info!(
            subject = %message.subject,
            recipients = %message.recipients.join(";"),
            "Notification dispatched (log sink)"
        );
        Ok(())
    }
}

/// Sink that captures every message, for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<EmailMessage>>,
}

impl RecordingSink {
    /// The messages captured so far.
    #[must_use]
    pub fn messages(&self) -> Vec<EmailMessage> {
        self.messages.lock().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        self.messages.lock().push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> EmailMessage {
        EmailMessage {
            subject: "subject".to_string(),
            from: "from@example.com".to_string(),
            recipients: vec!["to@example.com".to_string()],
            html_body: "<html></html>".to_string(),
        }
    }

    #[test]
    fn test_log_sink_accepts_messages() {
        assert!(LogSink.send(&message()).is_ok());
    }

    #[test]
    fn test_recording_sink_captures_in_order() {
        let sink = RecordingSink::default();
        sink.send(&message()).unwrap();
        let mut second = message();
        second.subject = "second".to_string();
        sink.send(&second).unwrap();

        let captured = sink.messages();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].subject, "subject");
        assert_eq!(captured[1].subject, "second");
    }
}
