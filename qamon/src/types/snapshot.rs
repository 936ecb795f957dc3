//! Result snapshot and history types.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::checklist::{Checklist, PassFail};

/// Timestamp format shared by history entries and snapshots.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a point in time the way history entries store it.
pub fn format_timestamp(at: DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// One recorded outcome of an Automated test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the cycle that produced this entry started.
    pub timestamp: String,
    /// Outcome of the test in that cycle.
    pub status: PassFail,
}

/// Append-only history keyed by test identity.
///
/// Entries are only ever pushed to the end of a series; nothing here
/// reorders or truncates them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(BTreeMap<String, Vec<HistoryEntry>>);

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to the series for `key`.
    pub fn append(&mut self, key: &str, entry: HistoryEntry) {
        self.0.entry(key.to_string()).or_default().push(entry);
    }

    /// Entries recorded for `key`, oldest first.
    pub fn entries(&self, key: &str) -> &[HistoryEntry] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of tracked test identities.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all series.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<HistoryEntry>)> {
        self.0.iter()
    }
}

/// The unit of publication: results, history and the cycle timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSnapshot {
    /// Checklist with result fields filled in for the cycle.
    pub results: Checklist,
    /// Full history including the cycle.
    pub history: History,
    /// Cycle timestamp.
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(ts: &str, status: PassFail) -> HistoryEntry {
        HistoryEntry {
            timestamp: ts.to_string(),
            status,
        }
    }

    #[test]
    fn test_history_append_keeps_order() {
        let mut history = History::new();
        history.append("A::x", entry("t1", PassFail::Pass));
        history.append("A::x", entry("t2", PassFail::Fail));
        history.append("A::x", entry("t3", PassFail::Pass));

        let statuses: Vec<_> = history.entries("A::x").iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![PassFail::Pass, PassFail::Fail, PassFail::Pass]
        );
        assert_eq!(history.entries("A::x")[0].timestamp, "t1");
    }

    #[test]
    fn test_history_unknown_key_is_empty() {
        let history = History::new();
        assert!(history.entries("missing").is_empty());
        assert!(history.is_empty());
    }

    #[test]
    fn test_history_serialization_shape() {
        let mut history = History::new();
        history.append("A::x", entry("2025-01-01 00:00:00", PassFail::Fail));
        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json["A::x"][0]["status"], "FAIL");
        assert_eq!(json["A::x"][0]["timestamp"], "2025-01-01 00:00:00");
    }

    #[test]
    fn test_format_timestamp() {
        let at = Local.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(format_timestamp(at), "2025-03-04 05:06:07");
    }
}
