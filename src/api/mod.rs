//! HTTP exposition endpoint for the gauge registry.

use crate::metrics::{Metrics, CONTENT_TYPE};
use axum::{extract::State, http::header, response::IntoResponse, routing::get, Router};
use std::sync::Arc;

/// Router serving the scrape endpoint and a liveness probe
pub fn create_router(metrics: Arc<Metrics>) -> Router {
    Router::new()
        .route("/metrics", get(serve_metrics))
        .route("/healthz", get(healthz))
        .with_state(metrics)
}

/// GET /metrics - all registered gauges in the Prometheus text format
async fn serve_metrics(State(metrics): State<Arc<Metrics>>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], metrics.render())
}

/// GET /healthz - liveness probe
async fn healthz() -> &'static str {
    "ok"
}
