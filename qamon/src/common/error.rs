//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! テスト単位の失敗（ネットワーク・判定）は [`crate::monitor::probe::ProbeError`] として
//! FAIL結果に変換され、ここには現れない。`MonitorError` は起動・永続化・API層の
//! エラーを表す。

use axum::http::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// QA monitor error type
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Checklist file missing (fatal at startup)
    #[error("Checklist file not found: {}", .0.display())]
    ChecklistMissing(PathBuf),

    /// Two tests share the same identity key
    #[error("Duplicate test identity: {0}")]
    DuplicateTest(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage error (results/history artifacts)
    #[error("Storage error: {0}")]
    Storage(String),

    /// No cycle has completed yet
    #[error("No data available")]
    NoData,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MonitorError {
    /// Returns a safe error message for external clients.
    ///
    /// File paths and parser details stay in the server logs.
    pub fn external_message(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration error",
            Self::ChecklistMissing(_) => "Checklist unavailable",
            Self::DuplicateTest(_) => "Invalid checklist",
            Self::Serialization(_) => "Serialization error",
            Self::Storage(_) => "Storage error",
            Self::NoData => "No data available",
            Self::Internal(_) => "Internal server error",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NoData => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config(_)
            | Self::ChecklistMissing(_)
            | Self::DuplicateTest(_)
            | Self::Serialization(_)
            | Self::Storage(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for MonitorError {
    fn from(err: anyhow::Error) -> Self {
        MonitorError::Storage(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_maps_to_service_unavailable() {
        let err = MonitorError::NoData;
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.external_message(), "No data available");
    }

    #[test]
    fn test_external_message_hides_paths() {
        let err = MonitorError::ChecklistMissing(PathBuf::from("/secret/dir/checklist.json"));
        assert!(err.to_string().contains("/secret/dir"));
        assert!(!err.external_message().contains("/secret"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_anyhow_conversion_keeps_context() {
        let err: MonitorError = anyhow::anyhow!("disk full")
            .context("Failed to write results")
            .into();
        let text = err.to_string();
        assert!(text.contains("Failed to write results"));
        assert!(text.contains("disk full"));
    }
}
