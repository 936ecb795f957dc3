//! REST / WebSocket API
//!
//! 読み取り専用の問い合わせ口。状態の変更はすべてQAループ側で行う。

pub mod dashboard_ws;
pub mod error;
pub mod metrics;
pub mod qa_data;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// APIルーターを作成
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/api/qa-data", get(qa_data::get_qa_data))
        .route("/ws/dashboard", get(dashboard_ws::dashboard_ws_handler))
        .route("/ws", get(dashboard_ws::dashboard_ws_handler))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/health", get(qa_data::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
