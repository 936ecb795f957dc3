//! QA monitor
//!
//! APIチェックリストを定期実行し、結果・履歴を記録して
//! 新規失敗を通知し、ダッシュボードへライブ配信するサービス

#![warn(missing_docs)]

/// 共通型定義（エラー型）
pub mod common;

/// チェックリスト・結果・履歴のデータ型
pub mod types;

/// エンドポイント解決と応答判定
pub mod checks;

/// 結果・履歴ファイルの読み書き
pub mod store;

/// QA実行ループ
pub mod monitor;

/// 新規失敗の通知チャネル
pub mod notify;

/// ライブ配信バス
pub mod events;

/// 最新スナップショットの保持
pub mod snapshot;

/// REST / WebSocket APIハンドラー
pub mod api;

/// 設定管理（環境変数）
pub mod config;

/// ロギング初期化ユーティリティ
pub mod logging;

/// CLIインターフェース
pub mod cli;

/// 起動時の初期化
pub mod bootstrap;

/// axumサーバー起動
pub mod server;

/// Cooperative shutdown controller
pub mod shutdown;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// 最新スナップショット
    pub snapshots: snapshot::SnapshotStore,
    /// ライブ配信バス
    pub bus: events::SharedSnapshotBus,
    /// Prometheusメトリクス
    pub metrics: std::sync::Arc<api::metrics::QaMetrics>,
    /// Cooperative shutdown controller
    pub shutdown: shutdown::ShutdownController,
}

impl AppState {
    /// 共有オブジェクトから状態を組み立てる
    pub fn new(
        snapshots: snapshot::SnapshotStore,
        bus: events::SharedSnapshotBus,
        metrics: api::metrics::QaMetrics,
        shutdown: shutdown::ShutdownController,
    ) -> Self {
        Self {
            snapshots,
            bus,
            metrics: std::sync::Arc::new(metrics),
            shutdown,
        }
    }
}
