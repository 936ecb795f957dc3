//! Microsoft Teams connector channel.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{post_webhook, FailureEvent, NotificationChannel, NotifyError};

/// Posts a legacy MessageCard to a Teams incoming webhook.
pub struct TeamsChannel {
    webhook_url: Option<String>,
    client: Client,
}

impl TeamsChannel {
    /// Create the channel; `None` disables it.
    pub fn new(webhook_url: Option<String>, client: Client) -> Self {
        Self {
            webhook_url,
            client,
        }
    }

    /// MessageCard payload for an event.
    pub fn payload(event: &FailureEvent) -> Value {
        json!({
            "@type": "MessageCard",
            "@context": "http://schema.org/extensions",
            "themeColor": "0076D7",
            "summary": "QA Test Failure",
            "sections": [{
                "activityTitle": "🚨 New QA Test Failed!",
                "facts": [
                    {"name": "Module:", "value": event.module},
                    {"name": "Test Case:", "value": event.test_case},
                    {"name": "Notes:", "value": event.notes}
                ]
            }]
        })
    }
}

#[async_trait]
impl NotificationChannel for TeamsChannel {
    fn name(&self) -> &'static str {
        "teams"
    }

    fn enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    async fn send(&self, event: &FailureEvent) -> Result<(), NotifyError> {
        let url = self.webhook_url.as_deref().ok_or(NotifyError::Disabled)?;
        post_webhook(&self.client, url, &Self::payload(event)).await
    }
}
