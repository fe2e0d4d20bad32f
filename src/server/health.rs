//! Service health endpoint
//!
//! Reports whether the proxy itself is up and when it last completed a poll
//! cycle. Printer problems are not service problems: a proxy whose printers
//! are all errored is still healthy.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::metrics;

use super::AppState;

// ============================================================================
// Health Status Types
// ============================================================================

/// Overall health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Starting,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Starting => "starting",
        }
    }
}

/// Summary of the last published cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub sequence: u64,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// Whether the HTTP listener is up and serving
    pub ready: bool,
    pub version: String,
    pub uptime_secs: u64,
    pub polling_interval_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_cycle: Option<CycleSummary>,
    pub printers: usize,
    pub printers_errored: usize,
}

// ============================================================================
// Health Checker
// ============================================================================

/// Tracks start time and readiness of the service
#[derive(Clone)]
pub struct HealthChecker {
    /// Whether the server has started serving
    ready: Arc<AtomicBool>,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthChecker {
    /// Create a new health checker
    pub fn new() -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(false)),
            start_time: Instant::now(),
        }
    }

    /// Mark the service as ready
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        tracing::info!("Health check: application marked as ready");
    }

    /// Check if the service is ready
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

// ============================================================================
// Health Router
// ============================================================================

/// Create health check router
pub fn create_health_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}

/// Health check handler, always 200
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.store.current().await;

    let last_cycle = (!snapshot.is_placeholder()).then(|| CycleSummary {
        sequence: snapshot.sequence,
        finished_at: snapshot.finished_at,
        duration_ms: snapshot.duration_ms,
    });

    let status = if last_cycle.is_some() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Starting
    };

    let response = HealthResponse {
        status,
        ready: state.health.is_ready(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.uptime_secs(),
        polling_interval_secs: state.config.polling_interval,
        last_cycle,
        printers: state.config.printers.len(),
        printers_errored: snapshot.errored_count(),
    };

    metrics::record_api_request("/health", StatusCode::OK.as_u16());
    (StatusCode::OK, Json(response))
}

// ============================================================================
// Tests
// ============================================================================
