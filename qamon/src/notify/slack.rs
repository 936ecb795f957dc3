//! Slack incoming-webhook channel.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{post_webhook, FailureEvent, NotificationChannel, NotifyError};

/// Posts `{"text": ...}` to a Slack incoming webhook.
pub struct SlackChannel {
    webhook_url: Option<String>,
    client: Client,
}

impl SlackChannel {
    /// Create the channel; `None` disables it.
    pub fn new(webhook_url: Option<String>, client: Client) -> Self {
        Self {
            webhook_url,
            client,
        }
    }

    /// Slack message payload for an event.
    pub fn payload(event: &FailureEvent) -> Value {
        json!({
            "text": format!(
                ":warning: New QA Test Failed!\n*Module:* {}\n*Test Case:* {}\n*Notes:* {}",
                event.module, event.test_case, event.notes
            )
        })
    }
}

#[async_trait]
impl NotificationChannel for SlackChannel {
    fn name(&self) -> &'static str {
        "slack"
    }

    fn enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    async fn send(&self, event: &FailureEvent) -> Result<(), NotifyError> {
        let url = self.webhook_url.as_deref().ok_or(NotifyError::Disabled)?;
        post_webhook(&self.client, url, &Self::payload(event)).await
    }
}
