//! Application state for the SOS REST API.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use sos_common::BindingConfig;
use sos_rest_protocol::ObservationsDecoder;

use crate::engine::{ObservationEngine, RecordingEngine};
use crate::metrics::MetricsCollector;

/// Shared application state.
pub struct AppState {
    /// Stateless decoder shared by all requests.
    pub decoder: ObservationsDecoder,

    /// Executes decoded requests.
    pub engine: Arc<dyn ObservationEngine>,

    pub metrics: MetricsCollector,

    /// Installed Prometheus recorder, if any.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// State with the default decoder and a recording engine.
    pub fn new(config: BindingConfig) -> Self {
        Self {
            decoder: ObservationsDecoder::new(config),
            engine: Arc::new(RecordingEngine::new()),
            metrics: MetricsCollector::new(),
            prometheus: None,
        }
    }

    pub fn with_engine(mut self, engine: Arc<dyn ObservationEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    pub fn config(&self) -> &BindingConfig {
        self.decoder.config()
    }
}
