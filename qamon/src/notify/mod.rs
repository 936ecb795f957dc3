//! 失敗通知ディスパッチャー
//!
//! 新規失敗イベントを設定済みの全チャネル（Slack / Discord / Teams / Email）へ配送する。
//! チャネルごとに独立したタスクで送信し、タイムアウトで打ち切る。
//! 配送失敗はログに記録するだけで、他チャネルやループには影響しない。

pub mod discord;
pub mod email;
pub mod slack;
pub mod teams;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::NotifyConfig;

pub use discord::DiscordChannel;
pub use email::EmailChannel;
pub use slack::SlackChannel;
pub use teams::TeamsChannel;

/// 新規失敗イベント
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureEvent {
    /// モジュール名
    pub module: String,
    /// テストケース名
    pub test_case: String,
    /// 失敗時の診断メッセージ
    pub notes: String,
}

/// 通知配送エラー
#[derive(Debug, Error)]
pub enum NotifyError {
    /// チャネルが無効
    #[error("channel is not configured")]
    Disabled,

    /// HTTP送信エラー
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Webhookが非2xxを返した
    #[error("webhook returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// メールアドレスの解析エラー
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// メール本文の組み立てエラー
    #[error("failed to build email: {0}")]
    Message(#[from] lettre::error::Error),

    /// SMTP送信エラー
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// 通知チャネル
///
/// 宛先設定の有無だけで有効・無効が決まる。
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// ログ用のチャネル名
    fn name(&self) -> &'static str;

    /// 宛先が設定されているか
    fn enabled(&self) -> bool;

    /// イベントを1件配送する
    async fn send(&self, event: &FailureEvent) -> Result<(), NotifyError>;
}

/// JSONペイロードをWebhookへPOSTする
pub(crate) async fn post_webhook(
    client: &Client,
    url: &str,
    payload: &serde_json::Value,
) -> Result<(), NotifyError> {
    let response = client.post(url).json(payload).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(NotifyError::Status(status));
    }
    Ok(())
}

/// 通知ディスパッチャー
#[derive(Clone)]
pub struct NotificationDispatcher {
    channels: Vec<Arc<dyn NotificationChannel>>,
    timeout: Duration,
}

impl NotificationDispatcher {
    /// チャネル一覧とチャネル単位のタイムアウトから作成
    pub fn new(channels: Vec<Arc<dyn NotificationChannel>>, timeout: Duration) -> Self {
        Self { channels, timeout }
    }

    /// 設定から4チャネルを組み立てる
    pub fn from_config(config: &NotifyConfig, client: Client) -> Self {
        let channels: Vec<Arc<dyn NotificationChannel>> = vec![
            Arc::new(SlackChannel::new(
                config.slack_webhook_url.clone(),
                client.clone(),
            )),
            Arc::new(DiscordChannel::new(
                config.discord_webhook_url.clone(),
                client.clone(),
            )),
            Arc::new(TeamsChannel::new(config.teams_webhook_url.clone(), client)),
            Arc::new(EmailChannel::new(config.smtp.clone(), config.timeout)),
        ];
        Self::new(channels, config.timeout)
    }

    /// 有効なチャネル名
    pub fn enabled_channels(&self) -> Vec<&'static str> {
        self.channels
            .iter()
            .filter(|c| c.enabled())
            .map(|c| c.name())
            .collect()
    }

    /// 有効な全チャネルへ非同期に配送する
    ///
    /// 呼び出し側はハンドルを待たずに破棄してよい（fire-and-forget）。
    pub fn dispatch(&self, event: FailureEvent) -> Vec<JoinHandle<()>> {
        let event = Arc::new(event);
        let mut handles = Vec::new();

        for channel in self.channels.iter().filter(|c| c.enabled()) {
            let channel = Arc::clone(channel);
            let event = Arc::clone(&event);
            let timeout = self.timeout;

            handles.push(tokio::spawn(async move {
                match tokio::time::timeout(timeout, channel.send(&event)).await {
                    Ok(Ok(())) => info!(
                        channel = channel.name(),
                        module = %event.module,
                        test_case = %event.test_case,
                        "Failure notification sent"
                    ),
                    Ok(Err(e)) => warn!(
                        channel = channel.name(),
                        error = %e,
                        "Failure notification failed"
                    ),
                    Err(_) => warn!(
                        channel = channel.name(),
                        timeout_secs = timeout.as_secs_f64(),
                        "Failure notification timed out"
                    ),
                }
            }));
        }

        if handles.is_empty() {
            debug!(
                module = %event.module,
                test_case = %event.test_case,
                "No notification channels configured"
            );
        }
        handles
    }
}
