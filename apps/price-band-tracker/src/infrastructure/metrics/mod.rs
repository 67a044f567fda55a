//! Prometheus Metrics Module
//!
//! In-process counters for the feed loop and the position engine. The
//! recorder is installed without an HTTP listener, so the values are only
//! visible in the snapshot logged at `info` when the process stops on Ctrl+C.
//!
//! # Metrics
//!
//! - `band_tracker_ticks_total`: prices evaluated by the engine
//! - `band_tracker_decode_errors_total`: messages dropped by the decoder
//! - `band_tracker_read_errors_total`: failed reads on the feed connection
//! - `band_tracker_reconnects_total`: reconnect attempts
//! - `band_tracker_feed_connected`: 1 while the feed is connected
//! - `band_tracker_positions_opened_total{side}`
//! - `band_tracker_positions_closed_total{side,reason}`

use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::domain::position::PositionEvent;

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Later calls return the same handle.
///
/// # Errors
///
/// Returns an error if another global recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    let _ = PROMETHEUS_HANDLE.set(handle.clone());
    Ok(handle)
}

/// Render the current metrics in Prometheus text format.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(PrometheusHandle::render)
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "band_tracker_ticks_total",
        "Prices decoded and evaluated by the position engine"
    );
    describe_counter!(
        "band_tracker_decode_errors_total",
        "Feed messages dropped because no price could be decoded"
    );
    describe_counter!(
        "band_tracker_read_errors_total",
        "Failed reads on the feed connection"
    );
    describe_counter!(
        "band_tracker_reconnects_total",
        "Feed reconnection attempts"
    );
    describe_gauge!(
        "band_tracker_feed_connected",
        "1 while the feed connection is up, 0 otherwise"
    );
    describe_counter!(
        "band_tracker_positions_opened_total",
        "Simulated positions opened, by side"
    );
    describe_counter!(
        "band_tracker_positions_closed_total",
        "Simulated positions closed, by side and reason"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Record a price evaluated by the engine.
pub fn record_tick() {
    counter!("band_tracker_ticks_total").increment(1);
}

/// Record a dropped, undecodable message.
pub fn record_decode_error() {
    counter!("band_tracker_decode_errors_total").increment(1);
}

/// Record a failed read.
pub fn record_read_error() {
    counter!("band_tracker_read_errors_total").increment(1);
}

/// Record a reconnect attempt.
pub fn record_reconnect() {
    counter!("band_tracker_reconnects_total").increment(1);
}

/// Update the connection gauge.
pub fn set_feed_connected(connected: bool) {
    gauge!("band_tracker_feed_connected").set(if connected { 1.0 } else { 0.0 });
}

/// Record a position transition.
pub fn record_position_event(event: &PositionEvent) {
    match event {
        PositionEvent::Opened { side, .. } => {
            counter!(
                "band_tracker_positions_opened_total",
                "side" => side.as_str()
            )
            .increment(1);
        }
        PositionEvent::Closed { side, reason, .. } => {
            counter!(
                "band_tracker_positions_closed_total",
                "side" => side.as_str(),
                "reason" => reason.metric_label()
            )
            .increment(1);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
