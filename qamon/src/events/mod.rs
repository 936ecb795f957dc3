//! ライブ配信バス
//!
//! サイクル完了ごとのスナップショットをWebSocketクライアントへ
//! ブロードキャストするための基盤。送信はノンブロッキングで、
//! 遅い購読者は古いスナップショットを取りこぼす（Lagged）だけでループを止めない。

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::types::ResultSnapshot;

/// バスのチャネル容量
///
/// 各メッセージは完全なスナップショットなので、最新のものだけが意味を持つ。
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// ライブクライアントへ送るメッセージ
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum LiveMessage<'a> {
    /// 接続直後の挨拶
    Connected {
        /// 表示用メッセージ
        message: &'static str,
    },
    /// 最新スナップショット
    Update(&'a ResultSnapshot),
    /// まだサイクルが完了していない
    NoData,
}

impl LiveMessage<'_> {
    /// JSON文字列へ変換
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// スナップショット配信バス
#[derive(Clone)]
pub struct SnapshotBus {
    sender: broadcast::Sender<Arc<ResultSnapshot>>,
}

impl Default for SnapshotBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotBus {
    /// 新しいバスを作成
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// バスを購読
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ResultSnapshot>> {
        self.sender.subscribe()
    }

    /// スナップショットを発行
    ///
    /// 購読者がいない場合でもエラーにはならない
    pub fn publish(&self, snapshot: Arc<ResultSnapshot>) {
        // 購読者がいない場合は送信に失敗するが、無視する
        let _ = self.sender.send(snapshot);
    }

    /// 現在の購読者数を取得
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Arc でラップされたバス
pub type SharedSnapshotBus = Arc<SnapshotBus>;

/// 共有可能なバスを作成
pub fn create_shared_bus() -> SharedSnapshotBus {
    Arc::new(SnapshotBus::new())
}
