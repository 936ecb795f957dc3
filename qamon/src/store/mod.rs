//! Durable JSON artifacts.
//!
//! The checklist is read once at startup. After every cycle the results file
//! and the history file are rewritten with write-then-rename so a crash in the
//! middle of a write leaves the previous version intact.

use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::common::error::MonitorError;
use crate::types::{Checklist, History, ResultSnapshot};

/// Load and validate the checklist. A missing file is fatal to the caller.
pub fn load_checklist(path: &Path) -> Result<Checklist, MonitorError> {
    if !path.exists() {
        return Err(MonitorError::ChecklistMissing(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Checklist::from_json(&content)
}

/// Serialize `value` as pretty JSON and atomically replace `path`.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    let tmp = tmp_path(path);
    let bytes = serde_json::to_vec_pretty(value)?;
    fs::write(&tmp, bytes).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move {} into place", path.display()))?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("artifact"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Results and history files written after each cycle.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    results_path: PathBuf,
    history_path: PathBuf,
}

impl ArtifactStore {
    /// Create a store for the given artifact paths.
    pub fn new(results_path: impl Into<PathBuf>, history_path: impl Into<PathBuf>) -> Self {
        Self {
            results_path: results_path.into(),
            history_path: history_path.into(),
        }
    }

    /// Path of the results artifact.
    pub fn results_path(&self) -> &Path {
        &self.results_path
    }

    /// Path of the history artifact.
    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    /// Load history persisted by a previous run.
    ///
    /// A missing or empty file yields an empty history. A file that exists
    /// but cannot be parsed is an error, so it is never overwritten by a
    /// fresh history.
    pub fn load_history(&self) -> Result<History> {
        if !self.history_path.exists() {
            return Ok(History::new());
        }
        let content = fs::read_to_string(&self.history_path)
            .with_context(|| format!("Failed to read {}", self.history_path.display()))?;
        if content.trim().is_empty() {
            return Ok(History::new());
        }
        let history = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.history_path.display()))?;
        Ok(history)
    }

    #[cfg(test)]
    fn load_results(&self) -> Result<Option<Checklist>> {
        if !self.results_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.results_path)
            .with_context(|| format!("Failed to read {}", self.results_path.display()))?;
        let results = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.results_path.display()))?;
        Ok(Some(results))
    }

    /// Persist the results and history of a snapshot.
    pub fn save(&self, snapshot: &ResultSnapshot) -> Result<()> {
        write_json_atomic(&self.results_path, &snapshot.results)?;
        write_json_atomic(&self.history_path, &snapshot.history)?;
        debug!(
            results = %self.results_path.display(),
            history = %self.history_path.display(),
            "Persisted cycle artifacts"
        );
        Ok(())
    }
}
