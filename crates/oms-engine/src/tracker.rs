//! Response tracking and latency measurement.
//!
//! Correlates exchange acknowledgements with dispatch timestamps and keeps
//! an append-only log of `(kind, order_id, latency)` records.
//!
//! The sent-orders table and the response log have their own
//! synchronization, independent of the order queue lock.

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

use oms_core::{OrderId, OrderResponse, ResponseRecord};
use oms_telemetry::Metrics;

/// Tracks send timestamps and records acknowledgement latency.
#[derive(Debug, Default)]
pub struct ResponseTracker {
    /// Send timestamp by order id. Entries are kept for the process lifetime
    /// so duplicate or late acknowledgements still correlate.
    sent_orders: DashMap<OrderId, Instant>,
    /// Append-only response log.
    response_log: Mutex<Vec<ResponseRecord>>,
}

impl ResponseTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `order_id` is being handed to the transport now.
    ///
    /// A later dispatch of the same id overwrites the timestamp.
    pub fn record_sent(&self, order_id: OrderId) -> Instant {
        let now = Instant::now();
        self.sent_orders.insert(order_id, now);
        now
    }

    /// Send timestamp for `order_id`, if it was ever dispatched.
    #[must_use]
    pub fn sent_at(&self, order_id: OrderId) -> Option<Instant> {
        self.sent_orders.get(&order_id).map(|entry| *entry.value())
    }

    /// Number of distinct order ids ever dispatched.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent_orders.len()
    }

    /// Handle an exchange acknowledgement.
    ///
    /// Appends a record with the dispatch-to-acknowledgement latency if the
    /// order was dispatched; otherwise reports an unmatched response and
    /// leaves the log untouched.
    pub fn on_response(&self, response: OrderResponse) -> Option<ResponseRecord> {
        let now = Instant::now();
        let order_id = response.order_id;

        let Some(sent_at) = self.sent_at(order_id) else {
            warn!(
                %order_id,
                kind = %response.kind,
                "Response received for unknown order"
            );
            Metrics::unmatched_response();
            return None;
        };

        let latency = now.saturating_duration_since(sent_at);
        let record = ResponseRecord::new(response.kind, order_id, latency);
        self.response_log.lock().push(record);

        let latency_ms = record.latency_ms();
        Metrics::response(response.kind.as_str(), latency_ms);
        info!(
            %order_id,
            kind = %response.kind,
            latency_ms,
            "Response received"
        );

        Some(record)
    }

    /// Copy of the response log in arrival order.
    #[must_use]
    pub fn response_log(&self) -> Vec<ResponseRecord> {
        self.response_log.lock().clone()
    }

    /// Number of response log entries.
    #[must_use]
    pub fn log_len(&self) -> usize {
        self.response_log.lock().len()
    }
}
