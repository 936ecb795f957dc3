//! Prometheus metrics
//!
//! Gauges are refreshed from the latest snapshot at scrape time, so the QA
//! loop never touches the registry.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, Gauge, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};
use tracing::error;

use crate::types::{PassFail, ResultSnapshot};
use crate::AppState;

/// QA monitor metric set
pub struct QaMetrics {
    registry: Registry,
    tests_total: IntGaugeVec,
    websocket_connections: IntGauge,
    up: IntGauge,
    last_test_timestamp: Gauge,
}

impl QaMetrics {
    /// Create and register all gauges.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let tests_total = IntGaugeVec::new(
            Opts::new("qa_tests_total", "Number of QA tests by status"),
            &["status"],
        )?;
        let websocket_connections = IntGauge::new(
            "qa_websocket_connections",
            "Number of live dashboard connections",
        )?;
        let up = IntGauge::new("qa_up", "Whether the QA monitor is running")?;
        let last_test_timestamp = Gauge::new(
            "qa_last_test_timestamp",
            "Unix time of the last completed QA cycle",
        )?;

        for collector in [
            Box::new(tests_total.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(websocket_connections.clone()),
            Box::new(up.clone()),
            Box::new(last_test_timestamp.clone()),
        ] {
            registry.register(collector)?;
        }

        up.set(1);

        Ok(Self {
            registry,
            tests_total,
            websocket_connections,
            up,
            last_test_timestamp,
        })
    }

    /// Refresh gauges from current state.
    pub fn observe(
        &self,
        snapshot: Option<&ResultSnapshot>,
        completed_at_unix: Option<f64>,
        connections: usize,
    ) {
        let (total, pass, fail) = snapshot
            .map(|s| {
                (
                    s.results.test_count(),
                    s.results.count_status(PassFail::Pass),
                    s.results.count_status(PassFail::Fail),
                )
            })
            .unwrap_or_default();

        self.tests_total.with_label_values(&["total"]).set(total as i64);
        self.tests_total.with_label_values(&["pass"]).set(pass as i64);
        self.tests_total.with_label_values(&["fail"]).set(fail as i64);
        self.websocket_connections.set(connections as i64);
        self.last_test_timestamp.set(completed_at_unix.unwrap_or(0.0));
        self.up.set(1);
    }

    /// Render the text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    let snapshot = state.snapshots.latest().await;
    let completed_at = state
        .snapshots
        .completed_at()
        .await
        .map(|t| t.timestamp_millis() as f64 / 1000.0);

    state
        .metrics
        .observe(snapshot.as_deref(), completed_at, state.bus.subscriber_count());

    match state.metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, TextEncoder::new().format_type().to_string())],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
