//! 型定義モジュール
//!
//! ドメインエンティティの型定義を提供

/// チェックリスト関連の型定義
pub mod checklist;

/// スナップショット・履歴の型定義
pub mod snapshot;

pub use checklist::{
    identity_key, AutomationType, CheckType, Checklist, Module, PassFail, TestCase,
};
pub use snapshot::{History, HistoryEntry, ResultSnapshot};
