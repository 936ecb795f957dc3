//! SMTP email channel.
//!
//! Sends a plain-text message over STARTTLS. Enabled only when server,
//! credentials and recipient are all configured.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

use super::{FailureEvent, NotificationChannel, NotifyError};
use crate::config::SmtpConfig;
use crate::types::snapshot::format_timestamp;

/// Email notification channel
pub struct EmailChannel {
    config: SmtpConfig,
    timeout: Duration,
}

impl EmailChannel {
    /// Create the channel with an SMTP command timeout.
    pub fn new(config: SmtpConfig, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    /// Subject line for an event.
    pub fn subject(event: &FailureEvent) -> String {
        format!("QA Test Failure: {} - {}", event.module, event.test_case)
    }

    /// Plain-text body for an event.
    pub fn body(event: &FailureEvent, at: DateTime<Local>) -> String {
        format!(
            "\nNew QA Test Failure Detected!\n\nModule: {}\nTest Case: {}\nNotes: {}\n\nTime: {}\n",
            event.module,
            event.test_case,
            event.notes,
            format_timestamp(at)
        )
    }

    /// Build the message without sending it.
    pub fn build_message(
        &self,
        event: &FailureEvent,
        at: DateTime<Local>,
    ) -> Result<Message, NotifyError> {
        let to: Mailbox = self
            .config
            .to
            .as_deref()
            .ok_or(NotifyError::Disabled)?
            .parse()?;
        let from: Mailbox = self
            .config
            .sender()
            .ok_or(NotifyError::Disabled)?
            .parse()?;

        Ok(Message::builder()
            .from(from)
            .to(to)
            .subject(Self::subject(event))
            .header(ContentType::TEXT_PLAIN)
            .body(Self::body(event, at))?)
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    fn enabled(&self) -> bool {
        self.config.is_complete()
    }

    async fn send(&self, event: &FailureEvent) -> Result<(), NotifyError> {
        let (Some(server), Some(username), Some(password)) = (
            self.config.server.as_deref(),
            self.config.username.clone(),
            self.config.password.clone(),
        ) else {
            return Err(NotifyError::Disabled);
        };

        let message = self.build_message(event, Local::now())?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(server)?
            .port(self.config.port)
            .credentials(Credentials::new(username, password))
            .timeout(Some(self.timeout))
            .build();

        transport.send(message).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config() -> SmtpConfig {
        SmtpConfig {
            server: Some("smtp.example.com".to_string()),
            port: 587,
            username: Some("qa-bot@example.com".to_string()),
            password: Some("secret".to_string()),
            from: None,
            to: Some("oncall@example.com".to_string()),
        }
    }

    fn event() -> FailureEvent {
        FailureEvent {
            module: "Users".to_string(),
            test_case: "Get user".to_string(),
            notes: "Unexpected response: {}".to_string(),
        }
    }

    #[test]
    fn test_enabled_requires_all_fields() {
        assert!(EmailChannel::new(config(), Duration::from_secs(5)).enabled());

        let mut missing_to = config();
        missing_to.to = None;
        assert!(!EmailChannel::new(missing_to, Duration::from_secs(5)).enabled());

        let mut missing_password = config();
        missing_password.password = None;
        assert!(!EmailChannel::new(missing_password, Duration::from_secs(5)).enabled());
    }

    #[test]
    fn test_subject_and_body() {
        let at = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(EmailChannel::subject(&event()), "QA Test Failure: Users - Get user");
        let body = EmailChannel::body(&event(), at);
        assert!(body.contains("Module: Users"));
        assert!(body.contains("Test Case: Get user"));
        assert!(body.contains("Time: 2025-01-02 03:04:05"));
    }

    #[test]
    fn test_build_message_defaults_sender_to_username() {
        let channel = EmailChannel::new(config(), Duration::from_secs(5));
        let message = channel.build_message(&event(), Local::now()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("From: qa-bot@example.com"));
        assert!(raw.contains("To: oncall@example.com"));
        assert!(raw.contains("Subject: QA Test Failure: Users - Get user"));
    }

    #[test]
    fn test_build_message_rejects_bad_address() {
        let mut bad = config();
        bad.to = Some("not an address".to_string());
        let channel = EmailChannel::new(bad, Duration::from_secs(5));
        assert!(matches!(
            channel.build_message(&event(), Local::now()),
            Err(NotifyError::Address(_))
        ));
    }
}
