//! 起動時の初期化ロジック
//!
//! チェックリスト・履歴の読み込み、HTTPクライアント・通知チャネルの構築など
//! QAループとAPIサーバーが共有するコンポーネントを組み立てる。

use reqwest::Client;
use std::time::Duration;
use tracing::info;

use crate::api::metrics::QaMetrics;
use crate::common::error::MonitorError;
use crate::config::{MonitorConfig, NotifyConfig};
use crate::events::create_shared_bus;
use crate::monitor::{Probe, QaMonitor};
use crate::notify::NotificationDispatcher;
use crate::shutdown::ShutdownController;
use crate::snapshot::SnapshotStore;
use crate::store::{load_checklist, ArtifactStore};
use crate::AppState;

/// 初期化結果
///
/// `monitor` はまだ起動していない。呼び出し側で `start` するか
/// `run_cycle` を直接呼ぶ。
pub struct InitContext {
    /// アプリケーション状態
    pub state: AppState,
    /// QA実行ループ
    pub monitor: QaMonitor,
}

/// 共有HTTPクライアントを作成
pub fn build_http_client(timeout: Duration) -> Result<Client, MonitorError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .map_err(|e| MonitorError::Config(format!("Failed to build HTTP client: {e}")))
}

/// 起動に必要な全コンポーネントを初期化する
///
/// チェックリストの欠落・重複、履歴ファイルの破損は起動失敗とする。
pub fn initialize(
    config: &MonitorConfig,
    notify: &NotifyConfig,
) -> Result<InitContext, MonitorError> {
    info!("QA monitor v{}", env!("CARGO_PKG_VERSION"));

    let checklist = load_checklist(&config.checklist_file)?;
    info!(
        path = %config.checklist_file.display(),
        modules = checklist.modules().len(),
        tests = checklist.test_count(),
        "Checklist loaded"
    );

    let store = ArtifactStore::new(&config.results_file, &config.history_file);
    let history = store.load_history()?;
    info!(
        path = %store.history_path().display(),
        keys = history.len(),
        "History loaded"
    );

    let probe = Probe::new(
        build_http_client(config.request_timeout)?,
        &config.api_base_url,
        config.placeholders.clone(),
    );
    let dispatcher = NotificationDispatcher::from_config(notify, build_http_client(notify.timeout)?);

    let snapshots = SnapshotStore::new();
    let bus = create_shared_bus();
    let metrics = QaMetrics::new().map_err(|e| MonitorError::Internal(e.to_string()))?;
    let shutdown = ShutdownController::default();

    let monitor = QaMonitor::new(checklist, probe, dispatcher, store)
        .with_history(history)
        .with_publisher(snapshots.clone(), bus.clone())
        .with_interval(config.refresh_interval);

    Ok(InitContext {
        state: AppState::new(snapshots, bus, metrics, shutdown),
        monitor,
    })
}
