//! Execution seam for decoded canonical requests.

use std::sync::Mutex;

use serde_json::{json, Value};
use sos_common::{SosError, SosResult};
use sos_rest_protocol::RestRequest;
use tracing::info;

/// Executes canonical requests produced by the decoder.
///
/// Query evaluation and storage live behind this trait; the HTTP host only
/// decodes and forwards.
pub trait ObservationEngine: Send + Sync {
    fn execute(&self, request: &RestRequest) -> SosResult<Value>;
}

/// Engine that records every request and acknowledges it as JSON.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    history: Mutex<Vec<RestRequest>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests executed so far, oldest first.
    pub fn recorded(&self) -> Vec<RestRequest> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }
}

impl ObservationEngine for RecordingEngine {
    fn execute(&self, request: &RestRequest) -> SosResult<Value> {
        info!(
            resource = %request.resource,
            kind = request.request.kind(),
            "Accepted canonical request"
        );

        let payload = serde_json::to_value(request)?;
        self.history
            .lock()
            .map_err(|_| SosError::Internal("request history lock poisoned".to_string()))?
            .push(request.clone());

        Ok(json!({
            "accepted": true,
            "request": payload,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sos_common::BindingConfig;
    use sos_rest_protocol::ObservationsDecoder;

    #[test]
    fn test_recording_engine_acknowledges() {
        let decoder = ObservationsDecoder::new(BindingConfig::default());
        let request = decoder.decode_get_by_id("obs-1");

        let engine = RecordingEngine::new();
        let response = engine.execute(&request).unwrap();

        assert_eq!(response["accepted"], true);
        assert_eq!(response["request"]["request"]["kind"], "get_by_id");
        assert_eq!(
            response["request"]["request"]["observation_identifiers"][0],
            "obs-1"
        );
        assert_eq!(engine.recorded(), vec![request]);
    }
}
