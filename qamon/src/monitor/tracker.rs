//! 失敗遷移トラッカー
//!
//! 前サイクルの失敗集合を保持し、「失敗していなかった → 失敗」への遷移だけを
//! 新規失敗として返す。連続して失敗しているテストは遷移時の1回しか通知されない。

use std::collections::HashSet;

/// 失敗遷移トラッカー
#[derive(Debug, Default, Clone)]
pub struct FailureTracker {
    previous: HashSet<String>,
}

impl FailureTracker {
    /// 空の状態で作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 今サイクルの失敗集合を渡し、新規失敗の識別キーを返す
    ///
    /// 返り値はソート済み。呼び出し後、`current` が無条件に前回集合となる。
    pub fn transition(&mut self, current: HashSet<String>) -> Vec<String> {
        let mut newly_failing: Vec<String> = current
            .iter()
            .filter(|key| !self.previous.contains(*key))
            .cloned()
            .collect();
        newly_failing.sort();
        self.previous = current;
        newly_failing
    }

    /// 現在失敗中として扱っているキー
    pub fn failing(&self) -> &HashSet<String> {
        &self.previous
    }

    #[cfg(test)]
    fn is_failing(&self, key: &str) -> bool {
        self.previous.contains(key)
    }
}
