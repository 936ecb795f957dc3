//! 最新QA結果の問い合わせAPI

use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::error::AppError;
use crate::AppState;

/// GET /api/qa-data
///
/// 最新スナップショット（results / history / timestamp）を返す。
/// サイクル未完了の間は 503 `{"error": "No data available"}`。
pub async fn get_qa_data(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let snapshot = state.snapshots.require_latest().await?;
    Ok(Json(serde_json::to_value(snapshot.as_ref())?))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
