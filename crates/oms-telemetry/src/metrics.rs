//! Prometheus metrics for the order management core.
//!
//! Provides observability for:
//! - Admission outcomes (queued / modified / cancelled / rejected)
//! - Queue depth and dispatch throughput
//! - Transport send failures
//! - Acknowledgement latency and unmatched responses
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.
//! These panics only occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_counter, register_int_gauge,
    CounterVec, Encoder, HistogramVec, IntCounter, IntGauge, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Admission outcomes.
/// Labels: outcome (queued/modified/cancelled/rejected_outside_window/...)
pub static ADMISSIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "oms_admissions_total",
        "Total inbound order instructions by admission outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Cancel-shaped instructions with no queued order to cancel.
/// Labels: action (enqueued/rejected)
pub static DEGENERATE_NEW_ORDERS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "oms_degenerate_new_orders_total",
        "Cancel-shaped instructions without a queued match",
        &["action"]
    )
    .unwrap()
});

/// Current order queue depth.
pub static QUEUE_DEPTH: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("oms_queue_depth", "Orders waiting for dispatch").unwrap()
});

/// Orders handed to the outbound transport.
pub static DISPATCHED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "oms_dispatched_total",
        "Total orders handed to the outbound transport"
    )
    .unwrap()
});

/// Failed transport sends.
/// Labels: reason (disconnected/timed_out/error)
pub static SEND_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "oms_send_failures_total",
        "Total failed sends to the outbound transport",
        &["reason"]
    )
    .unwrap()
});

/// Matched acknowledgements.
/// Labels: kind (accept/reject/unknown)
pub static RESPONSES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "oms_responses_total",
        "Total acknowledgements correlated with a dispatched order",
        &["kind"]
    )
    .unwrap()
});

/// Acknowledgements for orders never dispatched.
pub static UNMATCHED_RESPONSES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "oms_unmatched_responses_total",
        "Total acknowledgements for order ids with no send timestamp"
    )
    .unwrap()
});

/// Dispatch-to-acknowledgement latency in milliseconds.
pub static ACK_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "oms_ack_latency_ms",
        "Latency between dispatch and acknowledgement in milliseconds",
        &["kind"],
        vec![0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0, 500.0, 1000.0, 5000.0]
    )
    .unwrap()
});

/// Metrics helper for recording.
pub struct Metrics;

impl Metrics {
    /// Record an admission outcome.
    pub fn admission(outcome: &str) {
        ADMISSIONS_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Record a cancel-shaped instruction without a queued match.
    pub fn degenerate_new_order(action: &str) {
        DEGENERATE_NEW_ORDERS_TOTAL
            .with_label_values(&[action])
            .inc();
    }

    /// Update queue depth.
    pub fn queue_depth(depth: usize) {
        QUEUE_DEPTH.set(i64::try_from(depth).unwrap_or(i64::MAX));
    }

    /// Record an order handed to the transport.
    pub fn order_dispatched() {
        DISPATCHED_TOTAL.inc();
    }

    /// Record a failed transport send.
    pub fn send_failed(reason: &str) {
        SEND_FAILURES_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Record a matched acknowledgement and its latency.
    pub fn response(kind: &str, latency_ms: f64) {
        RESPONSES_TOTAL.with_label_values(&[kind]).inc();
        ACK_LATENCY_MS.with_label_values(&[kind]).observe(latency_ms);
    }

    /// Record an acknowledgement with no matching dispatch.
    pub fn unmatched_response() {
        UNMATCHED_RESPONSES_TOTAL.inc();
    }

    /// Render the default registry in Prometheus text exposition format.
    pub fn gather_text() -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let families = prometheus::gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&families, &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
