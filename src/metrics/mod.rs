//! Prometheus metrics for the relay
//!
//! This module provides metrics tracking for:
//! - Fetches: upstream errors per source
//! - Detection: occurrences posted and stale checks per category
//! - Delivery: messenger failures per category and operation
//! - Tracking: active events, expired and deleted events, driver cycle time
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops.

use axum::{http::StatusCode, routing::get, Router};
use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, CounterVec, Encoder, Gauge,
    HistogramVec, TextEncoder,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::OnceLock;

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for all relay metrics
struct RelayMetrics {
    fetch_errors: CounterVec,
    occurrences_posted: CounterVec,
    stale_checks: CounterVec,
    delivery_failures: CounterVec,
    tracked_removed: CounterVec,
    active_events: Gauge,
    cycle_duration: HistogramVec,
}

/// Global storage for relay metrics
static RELAY_METRICS: OnceLock<RelayMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// This function should be called once at application startup.
/// If metric registration fails, the error is returned and subsequent
/// metric operations become no-ops.
///
/// # Example
///
/// ```ignore
/// if let Err(e) = gardenwatch::metrics::init_metrics() {
///     tracing::warn!("Metrics initialization failed: {}", e);
/// }
/// ```
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    // Prevent double initialization
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let relay = RelayMetrics {
        fetch_errors: register_counter_vec!(
            "gardenwatch_fetch_errors_total",
            "Upstream fetch failures by source",
            &["source"]
        )?,
        occurrences_posted: register_counter_vec!(
            "gardenwatch_occurrences_posted_total",
            "New occurrences posted by category",
            &["category"]
        )?,
        stale_checks: register_counter_vec!(
            "gardenwatch_stale_checks_total",
            "Checks that found no new occurrence by category",
            &["category"]
        )?,
        delivery_failures: register_counter_vec!(
            "gardenwatch_delivery_failures_total",
            "Messenger failures by category and operation",
            &["category", "operation"]
        )?,
        tracked_removed: register_counter_vec!(
            "gardenwatch_tracked_events_removed_total",
            "Tracked events removed by reason",
            &["reason"]
        )?,
        active_events: register_gauge!(
            "gardenwatch_active_events",
            "Number of events currently tracked for live updates"
        )?,
        cycle_duration: register_histogram_vec!(
            "gardenwatch_cycle_duration_seconds",
            "Time spent in one driver cycle in seconds",
            &["driver"],
            vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
        )?,
    };

    RELAY_METRICS
        .set(relay)
        .map_err(|_| "Relay metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    RELAY_METRICS.get().is_some()
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

/// Record an upstream fetch failure
pub fn record_fetch_error(source: &str) {
    if let Some(m) = RELAY_METRICS.get() {
        m.fetch_errors.with_label_values(&[source]).inc();
    }
}

/// Record a posted occurrence
pub fn record_posted(category: &str) {
    if let Some(m) = RELAY_METRICS.get() {
        m.occurrences_posted.with_label_values(&[category]).inc();
    }
}

/// Record a check that found nothing new
pub fn record_stale(category: &str) {
    if let Some(m) = RELAY_METRICS.get() {
        m.stale_checks.with_label_values(&[category]).inc();
    }
}

/// Record a messenger failure
pub fn record_delivery_failure(category: &str, operation: &str) {
    if let Some(m) = RELAY_METRICS.get() {
        m.delivery_failures
            .with_label_values(&[category, operation])
            .inc();
    }
}

/// Record a tracked event leaving the tracker (`expired` or `deleted`)
pub fn record_tracked_removed(reason: &str) {
    if let Some(m) = RELAY_METRICS.get() {
        m.tracked_removed.with_label_values(&[reason]).inc();
    }
}

/// Update the active event gauge
pub fn set_active_events(count: usize) {
    if let Some(m) = RELAY_METRICS.get() {
        m.active_events.set(count as f64);
    }
}

/// Histogram timer guard that records duration on drop
pub struct MetricsTimer {
    timer: Option<prometheus::HistogramTimer>,
}

impl MetricsTimer {
    fn new(timer: prometheus::HistogramTimer) -> Self {
        Self { timer: Some(timer) }
    }

    /// Create a no-op timer when metrics are not initialized
    fn noop() -> Self {
        Self { timer: None }
    }
}

impl Drop for MetricsTimer {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop_and_record();
        }
    }
}

/// Start a driver cycle timer
pub fn start_cycle_timer(driver: &str) -> MetricsTimer {
    match RELAY_METRICS.get() {
        Some(m) => MetricsTimer::new(m.cycle_duration.with_label_values(&[driver]).start_timer()),
        None => MetricsTimer::noop(),
    }
}

// ============================================================================
// HTTP Endpoint
// ============================================================================

async fn metrics_handler() -> (StatusCode, String) {
    match encode_metrics() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {e}"),
        ),
    }
}

/// Router exposing `GET /metrics`
pub fn metrics_router() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serve `/metrics` until `shutdown` resolves
pub async fn serve_metrics(
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Metrics endpoint listening");

    axum::serve(listener, metrics_router())
        .with_graceful_shutdown(shutdown)
        .await
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
    fn test_init_metrics_idempotent() {
        assert!(init_metrics().is_ok());
        assert!(init_metrics().is_ok());
        assert!(metrics_initialized());
    }

    #[test]
    fn test_encode_metrics() {
        ensure_metrics_initialized();
        record_posted("seed");
        let text = encode_metrics().unwrap();
        assert!(text.contains("gardenwatch_occurrences_posted_total"));
    }

    #[test]
    fn test_recording_does_not_panic() {
        ensure_metrics_initialized();
        record_fetch_error("stock");
        record_stale("gear");
        record_delivery_failure("weather", "send");
        record_tracked_removed("expired");
        set_active_events(3);
        let _timer = start_cycle_timer("refresh");
    }

    #[tokio::test]
    async fn test_metrics_handler() {
        ensure_metrics_initialized();
        let (status, body) = metrics_handler().await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("gardenwatch_"));
    }
}
