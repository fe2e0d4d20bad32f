//! Prometheus metrics for the poller and the public API
//!
//! This module provides metrics tracking for:
//! - Poller: cycles, cycle duration, overruns, per-printer outcomes
//! - API: requests by endpoint and status
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops.

use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_histogram, Counter,
    CounterVec, Encoder, Gauge, Histogram, TextEncoder,
};
use std::sync::OnceLock;

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for poller metrics
struct PollerMetrics {
    cycles: Counter,
    cycle_duration: Histogram,
    cycle_overruns: Counter,
    printer_polls: CounterVec,
    printers_errored: Gauge,
}

/// Container for API metrics
struct ApiMetrics {
    requests: CounterVec,
}

/// Global storage for poller metrics
static POLLER_METRICS: OnceLock<PollerMetrics> = OnceLock::new();

/// Global storage for API metrics
static API_METRICS: OnceLock<ApiMetrics> = OnceLock::new();

/// Outcome of the one registration attempt
static METRICS_INIT: OnceLock<Result<(), String>> = OnceLock::new();

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// This function should be called once at application startup; later calls
/// return the outcome of the first one. If registration fails, metric
/// operations stay no-ops.
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    METRICS_INIT
        .get_or_init(|| register_metrics().map_err(|e| e.to_string()))
        .clone()
        .map_err(Into::into)
}

fn register_metrics() -> Result<(), Box<dyn std::error::Error>> {
    let poller = PollerMetrics {
        cycles: register_counter!(
            "ospap_poll_cycles_total",
            "Total number of completed poll cycles"
        )?,
        cycle_duration: register_histogram!(
            "ospap_poll_cycle_duration_seconds",
            "Time spent polling all printers in one cycle",
            vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]
        )?,
        cycle_overruns: register_counter!(
            "ospap_poll_cycle_overruns_total",
            "Poll cycles that took longer than the polling interval"
        )?,
        printer_polls: register_counter_vec!(
            "ospap_printer_polls_total",
            "Printer polls by printer and outcome",
            &["printer", "outcome"]
        )?,
        printers_errored: register_gauge!(
            "ospap_printers_errored",
            "Printers flagged as errored in the latest snapshot"
        )?,
    };

    let api = ApiMetrics {
        requests: register_counter_vec!(
            "ospap_api_requests_total",
            "Total API requests by endpoint and status",
            &["endpoint", "status"]
        )?,
    };

    POLLER_METRICS.set(poller).map_err(|_| "Poller metrics already initialized")?;
    API_METRICS.set(api).map_err(|_| "API metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record a finished poll cycle
pub fn record_cycle(duration_secs: f64, errored: usize) {
    let Some(m) = POLLER_METRICS.get() else {
        return;
    };

    m.cycles.inc();
    m.cycle_duration.observe(duration_secs);
    m.printers_errored.set(errored as f64);
}

/// Record a cycle that overran the polling interval
pub fn record_cycle_overrun() {
    if let Some(m) = POLLER_METRICS.get() {
        m.cycle_overruns.inc();
    }
}

/// Record the outcome of one printer poll
pub fn record_printer_poll(printer: &str, errored: bool) {
    if let Some(m) = POLLER_METRICS.get() {
        let outcome = if errored { "errored" } else { "ok" };
        m.printer_polls.with_label_values(&[printer, outcome]).inc();
    }
}

/// Record API request
pub fn record_api_request(endpoint: &str, status: u16) {
    if let Some(m) = API_METRICS.get() {
        let status_str = status.to_string();
        m.requests.with_label_values(&[endpoint, status_str.as_str()]).inc();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ensure_metrics_initialized() {
        let _ = init_metrics();
    }

    #[test]
    fn test_init_metrics() {
        let result = init_metrics();
        assert!(result.is_ok());

        // Second call should also be Ok (idempotent)
        let result2 = init_metrics();
        assert!(result2.is_ok());
    }

    #[test]
    fn test_encode_metrics() {
        ensure_metrics_initialized();
        record_cycle(0.2, 1);
        let text = encode_metrics().unwrap();
        assert!(text.contains("ospap_poll_cycles_total"));
    }

    #[test]
    fn test_recording_does_not_panic() {
        ensure_metrics_initialized();
        record_cycle_overrun();
        record_printer_poll("prusa", false);
        record_printer_poll("prusa", true);
        record_api_request("/api", 200);
    }
}
