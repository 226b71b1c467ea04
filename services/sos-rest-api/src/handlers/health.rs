//! Health and metrics handlers.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::metrics::MetricsSnapshot;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub requests: MetricsSnapshot,
}

/// GET /health - Basic health check
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    let config = state.config();
    Json(HealthResponse {
        status: "ok".to_string(),
        service: config.service.clone(),
        version: config.version.clone(),
        requests: state.metrics.snapshot(),
    })
}

/// GET /metrics - Prometheus metrics
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let body = state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::binding_config;

    #[tokio::test]
    async fn test_health_handler() {
        let state = Arc::new(AppState::new(binding_config()));
        state.metrics.record_request("search");

        let Json(response) = health_handler(Extension(state)).await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.service, "SOS");
        assert_eq!(response.requests.search, 1);
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let state = Arc::new(AppState::new(binding_config()));
        let response = metrics_handler(Extension(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
