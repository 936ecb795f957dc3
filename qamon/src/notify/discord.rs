//! Discord webhook channel.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{post_webhook, FailureEvent, NotificationChannel, NotifyError};

/// Posts `{"content": ...}` to a Discord webhook.
pub struct DiscordChannel {
    webhook_url: Option<String>,
    client: Client,
}

impl DiscordChannel {
    /// Create the channel; `None` disables it.
    pub fn new(webhook_url: Option<String>, client: Client) -> Self {
        Self {
            webhook_url,
            client,
        }
    }

    /// Discord message payload for an event.
    pub fn payload(event: &FailureEvent) -> Value {
        json!({
            "content": format!(
                "🚨 **New QA Test Failed!**\n**Module:** {}\n**Test Case:** {}\n**Notes:** {}",
                event.module, event.test_case, event.notes
            )
        })
    }
}

#[async_trait]
impl NotificationChannel for DiscordChannel {
    fn name(&self) -> &'static str {
        "discord"
    }

    fn enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    async fn send(&self, event: &FailureEvent) -> Result<(), NotifyError> {
        let url = self.webhook_url.as_deref().ok_or(NotifyError::Disabled)?;
        post_webhook(&self.client, url, &Self::payload(event)).await
    }
}
