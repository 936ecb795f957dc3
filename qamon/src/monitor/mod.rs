//! QA実行ループ
//!
//! チェックリストの自動テストを定期的に実行し、結果・履歴を更新して
//! 永続化し、新規失敗を通知し、スナップショットをライブ配信する。
//!
//! 1サイクルの流れ:
//! 1. 自動テストをHTTPで実行・判定（手動テストは触らない）
//! 2. 失敗集合と履歴を更新
//! 3. トラッカーで新規失敗を抽出して通知
//! 4. 結果・履歴ファイルを書き出す（失敗してもログのみ）
//! 5. スナップショットを差し替えて配信
//!
//! ループ自体の状態（チェックリスト・履歴・失敗集合）はこの構造体が専有し、
//! 読み手には差し替え済みの `Arc<ResultSnapshot>` だけを公開する。

pub mod probe;
pub mod tracker;

use chrono::Local;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::DEFAULT_REFRESH_INTERVAL_SECS;
use crate::events::{create_shared_bus, SharedSnapshotBus};
use crate::notify::{FailureEvent, NotificationDispatcher};
use crate::shutdown::ShutdownController;
use crate::snapshot::SnapshotStore;
use crate::store::ArtifactStore;
use crate::types::snapshot::format_timestamp;
use crate::types::{identity_key, Checklist, History, HistoryEntry, ResultSnapshot};

pub use probe::{Probe, ProbeError, TestOutcome};
pub use tracker::FailureTracker;

/// 1サイクル内で同時に実行するテスト数の上限
const MAX_CONCURRENT_PROBES: usize = 8;

/// 1サイクルの実行結果
#[derive(Debug)]
pub struct CycleReport {
    /// 配信したスナップショット
    pub snapshot: Arc<ResultSnapshot>,
    /// 今サイクルで新たに失敗したテスト
    pub new_failures: Vec<FailureEvent>,
    /// 通知タスク（待たずに破棄してよい）
    pub notifications: Vec<JoinHandle<()>>,
    /// 評価した自動テスト数
    pub evaluated: usize,
    /// 失敗した自動テスト数
    pub failed: usize,
    /// 結果ファイルの書き出しに成功したか
    pub persisted: bool,
}

/// QA実行ループ
pub struct QaMonitor {
    checklist: Checklist,
    history: History,
    tracker: FailureTracker,
    probe: Probe,
    dispatcher: NotificationDispatcher,
    store: ArtifactStore,
    snapshots: SnapshotStore,
    bus: SharedSnapshotBus,
    interval: Duration,
}

impl QaMonitor {
    /// 新しい実行ループを作成
    pub fn new(
        checklist: Checklist,
        probe: Probe,
        dispatcher: NotificationDispatcher,
        store: ArtifactStore,
    ) -> Self {
        Self {
            checklist,
            history: History::new(),
            tracker: FailureTracker::new(),
            probe,
            dispatcher,
            store,
            snapshots: SnapshotStore::new(),
            bus: create_shared_bus(),
            interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
        }
    }

    /// 前回起動時の履歴を引き継ぐ
    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }

    /// 配信先（問い合わせ用ストアとライブバス）を設定
    pub fn with_publisher(mut self, snapshots: SnapshotStore, bus: SharedSnapshotBus) -> Self {
        self.snapshots = snapshots;
        self.bus = bus;
        self
    }

    /// サイクル間の待機時間を設定
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// 現在の履歴
    pub fn history(&self) -> &History {
        &self.history
    }

    /// 現在のチェックリスト（結果反映済み）
    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    /// バックグラウンドでループを開始
    pub fn start(self, shutdown: ShutdownController) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// シャットダウン要求までサイクルを繰り返す
    pub async fn run(mut self, shutdown: ShutdownController) {
        info!(
            interval_secs = self.interval.as_secs_f64(),
            tests = self.checklist.test_count(),
            channels = ?self.dispatcher.enabled_channels(),
            "QA monitor started"
        );

        while !shutdown.is_shutdown_requested() {
            let report = self.run_cycle().await;
            debug!(
                notifications = report.notifications.len(),
                "Cycle notifications dispatched"
            );

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.wait() => break,
            }
        }

        info!("QA monitor stopped");
    }

    /// 1サイクルを実行する
    ///
    /// テスト単位の失敗はFAIL結果に、永続化の失敗はログに変換されるため、
    /// このメソッド自体は失敗しない。
    pub async fn run_cycle(&mut self) -> CycleReport {
        let timestamp = format_timestamp(Local::now());
        let outcomes = self.probe_automated().await;

        let mut current_failures = HashSet::new();
        let mut failure_events = HashMap::new();
        let evaluated = outcomes.len();

        for ((mi, ti), outcome) in outcomes {
            let module = &mut self.checklist.0[mi];
            let test = &mut module.tests[ti];
            let key = identity_key(&module.name, &test.test_case);

            let failed = outcome.failed();
            test.pass_fail = Some(outcome.status);
            test.notes = outcome.notes;

            if failed {
                debug!(test = %key, notes = %test.notes, "Test failed");
                failure_events.insert(
                    key.clone(),
                    FailureEvent {
                        module: module.name.clone(),
                        test_case: test.test_case.clone(),
                        notes: test.notes.clone(),
                    },
                );
                current_failures.insert(key.clone());
            }

            self.history.append(
                &key,
                HistoryEntry {
                    timestamp: timestamp.clone(),
                    status: outcome.status,
                },
            );
        }

        let newly_failing = self.tracker.transition(current_failures);
        let failed = self.tracker.failing().len();

        let mut new_failures = Vec::with_capacity(newly_failing.len());
        let mut notifications = Vec::new();
        for key in newly_failing {
            if let Some(event) = failure_events.remove(&key) {
                warn!(
                    module = %event.module,
                    test_case = %event.test_case,
                    "New QA test failure"
                );
                notifications.extend(self.dispatcher.dispatch(event.clone()));
                new_failures.push(event);
            }
        }

        let snapshot = Arc::new(ResultSnapshot {
            results: self.checklist.clone(),
            history: self.history.clone(),
            timestamp,
        });

        let persisted = self.persist(Arc::clone(&snapshot)).await;

        self.snapshots.replace(Arc::clone(&snapshot)).await;
        self.bus.publish(Arc::clone(&snapshot));

        info!(
            timestamp = %snapshot.timestamp,
            evaluated,
            failed,
            new_failures = new_failures.len(),
            subscribers = self.bus.subscriber_count(),
            persisted,
            "QA cycle completed"
        );

        CycleReport {
            snapshot,
            new_failures,
            notifications,
            evaluated,
            failed,
            persisted,
        }
    }

    /// 自動テストを並列実行し、(モジュール位置, テスト位置) ごとの結果を返す
    async fn probe_automated(&self) -> Vec<((usize, usize), TestOutcome)> {
        let mut targets = Vec::new();
        for (mi, module) in self.checklist.modules().iter().enumerate() {
            for (ti, test) in module.tests.iter().enumerate() {
                if test.is_automated() {
                    targets.push(((mi, ti), test.clone()));
                }
            }
        }

        let probe = self.probe.clone();
        stream::iter(targets)
            .map(move |(pos, test)| {
                let probe = probe.clone();
                async move { (pos, probe.run(&test).await) }
            })
            .buffered(MAX_CONCURRENT_PROBES)
            .collect()
            .await
    }

    /// 結果・履歴ファイルを書き出す
    async fn persist(&self, snapshot: Arc<ResultSnapshot>) -> bool {
        let store = self.store.clone();
        match tokio::task::spawn_blocking(move || store.save(&snapshot)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                error!(error = %format!("{e:#}"), "Failed to persist QA results");
                false
            }
            Err(e) => {
                error!(error = %e, "Persistence task panicked");
                false
            }
        }
    }
}
