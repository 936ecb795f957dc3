//! ロギング初期化ユーティリティ
//!
//! `QAMON_LOG_LEVEL`（なければ `RUST_LOG`、既定 `info`）でフィルタし、
//! 標準出力へ出力する。`QAMON_LOG_DIR` が設定されていれば日次ローテーションの
//! ファイル出力も追加する。

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::get_env;

const LOG_FILE_PREFIX: &str = "qamon.log";
const DEFAULT_LOG_LEVEL: &str = "info";

/// フィルタ文字列を決定する
pub fn log_filter_directive() -> String {
    get_env("QAMON_LOG_LEVEL")
        .or_else(|| get_env("RUST_LOG"))
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

fn build_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|e| {
        eprintln!("Invalid log filter {directive:?}: {e}; falling back to {DEFAULT_LOG_LEVEL}");
        EnvFilter::new(DEFAULT_LOG_LEVEL)
    })
}

/// グローバルsubscriberを初期化する
///
/// ファイル出力を有効にした場合は `WorkerGuard` を返す。
/// プロセス終了まで保持しないとバッファが書き出されない。
pub fn init() -> anyhow::Result<Option<WorkerGuard>> {
    let filter = build_filter(&log_filter_directive());
    let stdout_layer = fmt::layer().with_target(true);

    match get_env("QAMON_LOG_DIR") {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .try_init()?;
            Ok(None)
        }
    }
}
