//! Snapshot API handlers
//!
//! `GET /api` answers 200 whenever a snapshot can be serialized, however
//! many printers are errored: device health is data inside the payload, not
//! an HTTP status.

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::metrics;

use super::AppState;

/// Body returned when the snapshot cannot be serialized
pub const SERIALIZATION_ERROR_BODY: &str = "Could not generate response";

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(get_snapshot))
        .route("/metrics", get(get_metrics))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Current snapshot as a JSON array
async fn get_snapshot(State(state): State<AppState>) -> Response {
    let snapshot = state.store.current().await;

    let response = match snapshot.to_json() {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(e) => {
            tracing::error!(error = %e, sequence = snapshot.sequence, "Failed to serialize snapshot");
            (StatusCode::INTERNAL_SERVER_ERROR, SERIALIZATION_ERROR_BODY).into_response()
        }
    };

    metrics::record_api_request("/api", response.status().as_u16());
    response
}

/// Prometheus metrics in text format
async fn get_metrics() -> Response {
    match metrics::encode_metrics() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "Could not encode metrics").into_response()
        }
    }
}

/// Pre-serialized JSON body with the JSON content type
pub fn json_response(status: StatusCode, body: Vec<u8>) -> Response {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_response_headers() {
        let response = json_response(StatusCode::OK, b"[]".to_vec());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
