//! SOS REST API Service Library
//!
//! HTTP host for the RESTful observations binding: routes requests on the
//! observations resource through the decoder and hands the resulting
//! canonical requests to an observation engine.

pub mod config;
pub mod engine;
pub mod handlers;
pub mod metrics;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{any, get},
    Extension, Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Path prefix of the REST binding, matching the default service URL.
pub const REST_BASE_PATH: &str = "/sos/rest";

/// Build the service router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        // Observations resource
        .route(
            &format!("{}/observations", REST_BASE_PATH),
            any(handlers::observations::collection_handler),
        )
        .route(
            &format!("{}/observations/:observation_id", REST_BASE_PATH),
            any(handlers::observations::item_handler),
        )
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
