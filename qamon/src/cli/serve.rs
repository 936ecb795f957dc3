//! serve サブコマンド
//!
//! QAループとダッシュボードAPIサーバーを起動します。

use clap::Args;
use tracing::{error, info};

use crate::bootstrap::initialize;
use crate::config::{get_env, MonitorConfig, NotifyConfig};

/// Default listen port
pub const DEFAULT_PORT: u16 = 5000;

/// Default bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "QAMON_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(short = 'H', long, default_value = DEFAULT_HOST, env = "QAMON_HOST")]
    pub host: String,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            port: get_env("QAMON_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            host: get_env("QAMON_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
        }
    }
}

impl ServeArgs {
    /// `host:port` form for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// QAループを起動し、シャットダウンまでAPIサーバーを提供する
pub async fn execute(args: &ServeArgs) -> anyhow::Result<()> {
    let config = MonitorConfig::from_env();
    let notify = NotifyConfig::from_env();
    let ctx = initialize(&config, &notify)?;

    info!(
        target_url = %config.api_base_url,
        results = %config.results_file.display(),
        "Starting QA monitor"
    );

    let shutdown = ctx.state.shutdown.clone();
    let monitor_task = ctx.monitor.start(shutdown.clone());

    let served = crate::server::run(ctx.state, &args.bind_addr()).await;

    // サーバーが異常終了した場合もループを止める
    shutdown.request_shutdown();
    if let Err(e) = monitor_task.await {
        error!("QA monitor task failed: {}", e);
    }

    served?;
    Ok(())
}
