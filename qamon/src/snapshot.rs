//! Latest published snapshot.
//!
//! The execution loop replaces the whole snapshot at once; readers clone the
//! `Arc` and never observe a partially updated cycle.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::common::error::MonitorError;
use crate::types::ResultSnapshot;

#[derive(Debug, Clone)]
struct Published {
    snapshot: Arc<ResultSnapshot>,
    completed_at: DateTime<Utc>,
}

/// Shared holder of the most recent cycle result.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<Option<Published>>>,
}

impl SnapshotStore {
    /// Create an empty store ("no data yet").
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a new snapshot.
    pub async fn replace(&self, snapshot: Arc<ResultSnapshot>) {
        let published = Published {
            snapshot,
            completed_at: Utc::now(),
        };
        *self.inner.write().await = Some(published);
    }

    /// Latest snapshot, if any cycle has completed.
    pub async fn latest(&self) -> Option<Arc<ResultSnapshot>> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|p| Arc::clone(&p.snapshot))
    }

    /// Latest snapshot, or [`MonitorError::NoData`].
    pub async fn require_latest(&self) -> Result<Arc<ResultSnapshot>, MonitorError> {
        self.latest().await.ok_or(MonitorError::NoData)
    }

    /// Wall-clock time the latest snapshot was published.
    pub async fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.as_ref().map(|p| p.completed_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Checklist, History};

    fn snapshot(ts: &str) -> Arc<ResultSnapshot> {
        Arc::new(ResultSnapshot {
            results: Checklist::default(),
            history: History::new(),
            timestamp: ts.to_string(),
        })
    }

    #[tokio::test]
    async fn test_empty_store_reports_no_data() {
        let store = SnapshotStore::new();
        assert!(store.latest().await.is_none());
        assert!(store.completed_at().await.is_none());
        assert!(matches!(
            store.require_latest().await,
            Err(MonitorError::NoData)
        ));
    }

    #[tokio::test]
    async fn test_replace_swaps_whole_snapshot() {
        let store = SnapshotStore::new();
        store.replace(snapshot("t1")).await;
        let first = store.latest().await.unwrap();

        store.replace(snapshot("t2")).await;
        let second = store.latest().await.unwrap();

        // readers holding the old Arc keep a consistent view
        assert_eq!(first.timestamp, "t1");
        assert_eq!(second.timestamp, "t2");
        assert!(store.completed_at().await.is_some());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = SnapshotStore::new();
        let reader = store.clone();
        store.replace(snapshot("t1")).await;
        assert_eq!(reader.latest().await.unwrap().timestamp, "t1");
    }
}
