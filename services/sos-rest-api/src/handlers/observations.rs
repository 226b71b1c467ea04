//! Handlers for the observations resource.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, RawQuery},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use sos_common::SosError;
use sos_rest_protocol::{
    CanonicalRequest, ExceptionReport, HttpMethod, InboundRequest, OptionsDescriptor,
};
use tracing::{debug, error, warn};

use crate::state::AppState;

/// ANY /observations
pub async fn collection_handler(
    Extension(state): Extension<Arc<AppState>>,
    method: Method,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    handle(&state, &method, None, query.as_deref(), &body)
}

/// ANY /observations/{id}
pub async fn item_handler(
    Extension(state): Extension<Arc<AppState>>,
    method: Method,
    Path(observation_id): Path<String>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    handle(
        &state,
        &method,
        Some(observation_id.as_str()),
        query.as_deref(),
        &body,
    )
}

fn handle(
    state: &AppState,
    method: &Method,
    path: Option<&str>,
    query: Option<&str>,
    body: &[u8],
) -> Response {
    let method = match method.as_str().parse::<HttpMethod>() {
        Ok(method) => method,
        Err(e) => return reject(state, e),
    };

    let inbound = InboundRequest {
        method,
        path,
        query,
        body: (!body.is_empty()).then_some(body),
    };

    let rest = match state.decoder.decode(&inbound) {
        Ok(rest) => rest,
        Err(e) => return reject(state, e),
    };
    state.metrics.record_request(rest.request.kind());

    if let CanonicalRequest::Options(options) = &rest.request {
        return options_response(options);
    }

    match state.engine.execute(&rest) {
        Ok(value) => {
            debug!(kind = rest.request.kind(), "Request executed");
            (StatusCode::OK, Json(value)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Observation engine failed");
            exception_response(state, &e)
        }
    }
}

fn reject(state: &AppState, e: SosError) -> Response {
    state.metrics.record_failure(e.ows_exception_code());
    if e.is_client_error() {
        warn!(reason = e.reason(), error = %e, "Request rejected");
    } else {
        error!(reason = e.reason(), error = %e, "Request failed");
    }
    exception_response(state, &e)
}

fn options_response(options: &OptionsDescriptor) -> Response {
    (
        StatusCode::NO_CONTENT,
        [(header::ALLOW, options.allowed_methods().join(", "))],
    )
        .into_response()
}

/// Render an error as an `ows:ExceptionReport` with its HTTP status.
pub fn exception_response(state: &AppState, e: &SosError) -> Response {
    let report = ExceptionReport::from_error(&state.config().version, e);
    let status =
        StatusCode::from_u16(report.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    match report.to_xml() {
        Ok(xml) => (status, [(header::CONTENT_TYPE, "application/xml")], xml).into_response(),
        Err(render_err) => {
            error!(error = %render_err, "Failed to render exception report");
            (status, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use test_utils::{binding_config, offerings, ObservationXml};
    use tower::ServiceExt;

    use crate::engine::RecordingEngine;
    use crate::REST_BASE_PATH;

    fn setup() -> (Arc<AppState>, Arc<RecordingEngine>) {
        let engine = Arc::new(RecordingEngine::new());
        let state = AppState::new(binding_config()).with_engine(engine.clone());
        (Arc::new(state), engine)
    }

    async fn send(state: Arc<AppState>, method: &str, uri: &str, body: Body) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(format!("{}{}", REST_BASE_PATH, uri))
            .body(body)
            .unwrap();
        crate::app(state).oneshot(request).await.unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let (state, engine) = setup();
        let response = send(state.clone(), "GET", "/observations/obs-42", Body::empty()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["request"]["request"]["kind"], "get_by_id");

        let recorded = engine.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(state.metrics.snapshot().get_by_id, 1);
    }

    #[tokio::test]
    async fn test_search() {
        let (state, engine) = setup();
        let response = send(
            state,
            "GET",
            "/observations?observedProperty=p1,p2,p3",
            Body::empty(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let recorded = engine.recorded();
        assert_eq!(
            recorded[0].query_string.as_deref(),
            Some("observedProperty=p1,p2,p3")
        );
    }

    #[tokio::test]
    async fn test_unknown_parameter_exception_report() {
        let (state, engine) = setup();
        let response = send(state.clone(), "GET", "/observations?foo=bar", Body::empty()).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/xml"
        );
        let xml = body_string(response).await;
        assert!(xml.contains("exceptionCode=\"InvalidParameterValue\""));
        assert!(xml.contains("locator=\"foo\""));
        assert!(engine.recorded().is_empty());
        assert_eq!(state.metrics.snapshot().decode_failures, 1);
    }

    #[tokio::test]
    async fn test_get_collection_is_bad_request() {
        let (state, _) = setup();
        let response = send(state, "GET", "/observations", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_observation() {
        let (state, engine) = setup();
        let body = ObservationXml::default()
            .with_offering(offerings::OFF1)
            .with_offering(offerings::OFF2)
            .build();
        let response = send(state, "POST", "/observations", Body::from(body)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let recorded = engine.recorded();
        let CanonicalRequest::Insert(insert) = &recorded[0].request else {
            panic!("expected Insert");
        };
        assert_eq!(insert.offerings, vec!["off1".to_string(), "off2".to_string()]);
        assert_eq!(insert.observation.procedure, "proc1");
    }

    #[tokio::test]
    async fn test_post_without_body() {
        let (state, _) = setup();
        let response = send(state, "POST", "/observations", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let xml = body_string(response).await;
        assert!(xml.contains("OperationNotSupported"));
    }

    #[tokio::test]
    async fn test_post_on_item() {
        let (state, _) = setup();
        let body = ObservationXml::default().build();
        let response = send(state, "POST", "/observations/obs-1", Body::from(body)).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_post_malformed() {
        let (state, _) = setup();
        let response = send(
            state,
            "POST",
            "/observations",
            Body::from("<Observation><OM_Observation>"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete() {
        let (state, engine) = setup();
        let response = send(state, "DELETE", "/observations/obs-9", Body::empty()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(engine.recorded()[0].request.kind(), "delete");
    }

    #[tokio::test]
    async fn test_put_not_allowed() {
        let (state, _) = setup();
        let response = send(state, "PUT", "/observations/obs-9", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_options_allow_header() {
        let (state, engine) = setup();

        let response = send(state.clone(), "OPTIONS", "/observations", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers().get(header::ALLOW).unwrap(),
            "GET, POST, OPTIONS"
        );

        let response = send(state.clone(), "OPTIONS", "/observations?offering=o1", Body::empty()).await;
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET, OPTIONS");

        let response = send(state.clone(), "OPTIONS", "/observations/obs-1", Body::empty()).await;
        assert_eq!(
            response.headers().get(header::ALLOW).unwrap(),
            "GET, DELETE, OPTIONS"
        );

        // OPTIONS is answered without the engine.
        assert!(engine.recorded().is_empty());
        assert_eq!(state.metrics.snapshot().options, 3);
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let (state, _) = setup();
        let response = send(state, "PATCH", "/observations/obs-1", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
