//! Dispatcher loop for rate-limited order release.
//!
//! Implements the fixed-cadence loop that, once per interval:
//! - Removes up to `max_orders_per_interval` orders from the queue front
//! - Records a send timestamp per order at the moment of hand-off
//! - Sends each order through the outbound transport, outside the queue lock
//!
//! The cap is hard per interval; orders beyond it wait for later intervals
//! in FIFO order.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use oms_core::OrderRequest;
use oms_telemetry::Metrics;

use crate::error::{EngineError, EngineResult};
use crate::queue::OrderQueue;
use crate::tracker::ResponseTracker;
use crate::transport::{DynTransport, SendResult};

// ============================================================================
// DispatchConfig
// ============================================================================

/// Configuration for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Maximum orders handed to the transport per interval.
    #[serde(default = "default_max_orders_per_interval")]
    pub max_orders_per_interval: usize,
    /// Interval between dispatch rounds in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Upper bound on a single transport send in milliseconds.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
}

fn default_max_orders_per_interval() -> usize {
    2
}

fn default_interval_ms() -> u64 {
    1_000
}

fn default_send_timeout_ms() -> u64 {
    1_000
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_orders_per_interval: default_max_orders_per_interval(),
            interval_ms: default_interval_ms(),
            send_timeout_ms: default_send_timeout_ms(),
        }
    }
}

impl DispatchConfig {
    /// Reject configurations the loop cannot run with.
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_orders_per_interval == 0 {
            return Err(EngineError::InvalidConfig(
                "max_orders_per_interval must be positive".to_string(),
            ));
        }
        if self.interval_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "interval_ms must be positive".to_string(),
            ));
        }
        if self.send_timeout_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "send_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    #[must_use]
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

// ============================================================================
// DispatchReport
// ============================================================================

/// Outcome of one dispatch interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Orders the transport accepted.
    pub sent: usize,
    /// Orders whose send failed or timed out. They are not requeued.
    pub failed: usize,
    /// Orders left queued after the batch was removed.
    pub remaining: usize,
}

impl DispatchReport {
    /// Orders removed from the queue this interval.
    #[must_use]
    pub fn dispatched(&self) -> usize {
        self.sent + self.failed
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Drains the order queue at a bounded rate.
pub struct Dispatcher {
    queue: Arc<OrderQueue>,
    tracker: Arc<ResponseTracker>,
    transport: DynTransport,
    config: DispatchConfig,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("queue_len", &self.queue.len())
            .finish()
    }
}

impl Dispatcher {
    /// Create a new dispatcher.
    pub fn new(
        queue: Arc<OrderQueue>,
        tracker: Arc<ResponseTracker>,
        transport: DynTransport,
        config: DispatchConfig,
    ) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            queue,
            tracker,
            transport,
            config,
        })
    }

    /// Get the dispatch interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.config.interval()
    }

    #[must_use]
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Run one dispatch interval.
    ///
    /// 1. Removes `min(queue length, max_orders_per_interval)` orders from
    ///    the queue front under the queue lock
    /// 2. For each order in FIFO order, records its send timestamp and hands
    ///    it to the transport (lock already released)
    pub async fn tick(&self) -> DispatchReport {
        let (batch, remaining) = self.queue.drain_batch(self.config.max_orders_per_interval);

        let mut report = DispatchReport {
            remaining,
            ..DispatchReport::default()
        };

        if batch.is_empty() {
            return report;
        }

        debug!(batch_size = batch.len(), remaining, "tick: dispatching batch");

        for order in batch {
            let order_id = order.order_id;
            self.tracker.record_sent(order_id);
            Metrics::order_dispatched();

            match self.send(order).await {
                SendResult::Sent => {
                    report.sent += 1;
                    trace!(%order_id, "Order handed to transport");
                }
                result => {
                    report.failed += 1;
                    Metrics::send_failed(result.label());
                    warn!(%order_id, ?result, "Send failed, order not requeued");
                }
            }
        }

        report
    }

    /// Send one order, bounded by the configured send timeout.
    async fn send(&self, order: OrderRequest) -> SendResult {
        match tokio::time::timeout(self.config.send_timeout(), self.transport.send(order)).await {
            Ok(result) => result,
            Err(_) => SendResult::TimedOut,
        }
    }

    /// Run the dispatch loop until `token` is cancelled.
    ///
    /// Cancellation is only observed between intervals, so a batch that has
    /// started is always completed.
    pub async fn run(self: Arc<Self>, token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_ms = self.config.interval_ms,
            max_orders_per_interval = self.config.max_orders_per_interval,
            "Dispatcher started"
        );

        loop {
            tokio::select! {
                biased;
                () = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let report = self.tick().await;
            if report.dispatched() > 0 {
                debug!(
                    sent = report.sent,
                    failed = report.failed,
                    remaining = report.remaining,
                    "Dispatch interval complete"
                );
            }
        }

        info!(remaining = self.queue.len(), "Dispatcher stopped");
    }

    /// Spawn the dispatch loop on the current Tokio runtime.
    pub fn spawn(self: Arc<Self>) -> DispatcherHandle {
        let token = CancellationToken::new();
        let join = tokio::spawn(self.run(token.clone()));
        DispatcherHandle {
            token,
            join: Some(join),
        }
    }
}

// ============================================================================
// DispatcherHandle
// ============================================================================

/// Owned handle to a running dispatch loop.
///
/// Dropping the handle without calling [`DispatcherHandle::stop`] still
/// signals the loop to exit, but does not wait for it.
#[derive(Debug)]
pub struct DispatcherHandle {
    token: CancellationToken,
    join: Option<JoinHandle<()>>,
}

impl DispatcherHandle {
    /// Check if the loop task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Signal the loop to stop and wait for it to exit.
    ///
    /// Any in-flight batch completes before this returns.
    pub async fn stop(mut self) -> EngineResult<()> {
        self.token.cancel();
        if let Some(join) = self.join.take() {
            join.await
                .map_err(|e| EngineError::TaskJoin(e.to_string()))?;
        }
        Ok(())
    }
}

impl Drop for DispatcherHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

// ============================================================================
// Tests
// ============================================================================
