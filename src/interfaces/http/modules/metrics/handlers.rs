//! Prometheus metrics handler
//!
//! Exposes `GET /metrics` in Prometheus text format, rendered from the
//! recorder installed at start-up. Besides the HTTP series this carries
//! `tariff_resolutions_total` and `ratebook_propagated_rows_total`.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Shared state for the metrics endpoint
#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
}

/// `GET /metrics`: Prometheus scrape endpoint, outside the identity layer
pub async fn prometheus_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    let body = state.handle.render();
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}
