//! Order manager facade.
//!
//! Wires the trading window gate, the order queue, the dispatcher and the
//! response tracker together, and exposes the inbound entry points:
//! - [`OrderManager::on_data`]: new / modify / cancel instructions
//! - [`OrderManager::on_response`]: exchange acknowledgements
//! - [`OrderManager::send_logon`] / [`OrderManager::send_logout`]: session

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use oms_core::{
    AdmissionOutcome, OrderRequest, OrderResponse, RejectReason, ResponseRecord, TradingWindow,
    WallClock,
};
use oms_telemetry::Metrics;

use crate::dispatcher::{DispatchConfig, Dispatcher, DispatcherHandle};
use crate::error::EngineResult;
use crate::queue::{OrderQueue, UnmatchedCancelPolicy};
use crate::tracker::ResponseTracker;
use crate::transport::{DynSession, DynTransport};

/// Configuration for [`OrderManager`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    pub window: TradingWindow,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub unmatched_cancel: UnmatchedCancelPolicy,
}

impl ManagerConfig {
    pub fn new(window: TradingWindow) -> Self {
        Self {
            window,
            dispatch: DispatchConfig::default(),
            unmatched_cancel: UnmatchedCancelPolicy::default(),
        }
    }
}

/// Order management core.
///
/// Admission and response calls may come from any thread; the dispatcher
/// runs as a single Tokio task between [`start`](Self::start) and
/// [`stop`](Self::stop).
pub struct OrderManager {
    window: RwLock<TradingWindow>,
    clock: Arc<dyn WallClock>,
    queue: Arc<OrderQueue>,
    tracker: Arc<ResponseTracker>,
    dispatcher: Arc<Dispatcher>,
    session: DynSession,
    unmatched_cancel: UnmatchedCancelPolicy,
    handle: Mutex<Option<DispatcherHandle>>,
}

impl std::fmt::Debug for OrderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderManager")
            .field("window", &*self.window.read())
            .field("queue_len", &self.queue.len())
            .field("unmatched_cancel", &self.unmatched_cancel)
            .field("running", &self.is_running())
            .finish()
    }
}

impl OrderManager {
    /// Create a manager. The dispatcher is not started.
    pub fn new(
        config: ManagerConfig,
        clock: Arc<dyn WallClock>,
        transport: DynTransport,
        session: DynSession,
    ) -> EngineResult<Self> {
        config.window.validate()?;

        let queue = Arc::new(OrderQueue::new());
        let tracker = Arc::new(ResponseTracker::new());
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&queue),
            Arc::clone(&tracker),
            transport,
            config.dispatch,
        )?);

        Ok(Self {
            window: RwLock::new(config.window),
            clock,
            queue,
            tracker,
            dispatcher,
            session,
            unmatched_cancel: config.unmatched_cancel,
            handle: Mutex::new(None),
        })
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Spawn the dispatch loop. Calling it while running does nothing.
    ///
    /// A loop that has exited without [`stop`](Self::stop), e.g. because the
    /// transport panicked, is replaced by a fresh one.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let mut handle = self.handle.lock();
        match handle.as_ref() {
            Some(running) if !running.is_finished() => {
                warn!("Dispatcher already running, start ignored");
                return;
            }
            Some(_) => error!("Dispatcher loop exited unexpectedly, restarting"),
            None => {}
        }
        *handle = Some(Arc::clone(&self.dispatcher).spawn());
        info!(window = %self.window(), "Order manager started");
    }

    /// Stop the dispatch loop and wait for it to exit.
    ///
    /// An in-flight batch completes first. Orders still queued afterwards
    /// are not sent; their count is returned.
    pub async fn stop(&self) -> EngineResult<usize> {
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            handle.stop().await?;
        }

        let remaining = self.queue.len();
        if remaining > 0 {
            warn!(remaining, "Order manager stopped with unsent orders");
        } else {
            info!("Order manager stopped");
        }
        Ok(remaining)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // ------------------------------------------------------------------------
    // Inbound
    // ------------------------------------------------------------------------

    /// Admit an inbound instruction.
    ///
    /// Outside the trading window the instruction is rejected and the queue
    /// is untouched. Inside, it is reconciled against the queued orders.
    pub fn on_data(&self, request: OrderRequest) -> AdmissionOutcome {
        let order_id = request.order_id;
        let window = self.window();

        if !window.is_open(self.clock.as_ref()) {
            let outcome = AdmissionOutcome::Rejected(RejectReason::OutsideWindow);
            warn!(
                %order_id,
                %window,
                now = %self.clock.time_of_day(),
                "Order rejected outside trading window"
            );
            Metrics::admission(outcome.as_str());
            return outcome;
        }

        let cancel_shaped = request.is_cancel_shaped();
        let outcome = self.queue.reconcile(request, self.unmatched_cancel);

        match outcome {
            AdmissionOutcome::Queued if cancel_shaped => {
                warn!(%order_id, "Cancel for unknown order queued as new order");
                Metrics::degenerate_new_order("enqueued");
            }
            AdmissionOutcome::Rejected(RejectReason::UnmatchedCancel) => {
                warn!(%order_id, "Cancel for unknown order rejected");
                Metrics::degenerate_new_order("rejected");
            }
            AdmissionOutcome::Queued => info!(%order_id, "Order queued"),
            AdmissionOutcome::Modified => info!(%order_id, "Order modified"),
            AdmissionOutcome::Cancelled => info!(%order_id, "Order cancelled"),
            AdmissionOutcome::Rejected(RejectReason::OutsideWindow) => {}
        }

        Metrics::admission(outcome.as_str());
        outcome
    }

    /// Handle an exchange acknowledgement.
    pub fn on_response(&self, response: OrderResponse) -> Option<ResponseRecord> {
        self.tracker.on_response(response)
    }

    pub fn send_logon(&self) {
        self.session.send_logon();
    }

    pub fn send_logout(&self) {
        self.session.send_logout();
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    #[must_use]
    pub fn queue(&self) -> &Arc<OrderQueue> {
        &self.queue
    }

    #[must_use]
    pub fn tracker(&self) -> &Arc<ResponseTracker> {
        &self.tracker
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Current trading window.
    #[must_use]
    pub fn window(&self) -> TradingWindow {
        *self.window.read()
    }

    /// Replace the trading window. Takes effect on the next admission.
    pub fn set_window(&self, window: TradingWindow) -> EngineResult<()> {
        window.validate()?;
        *self.window.write() = window;
        info!(%window, "Trading window updated");
        Ok(())
    }
}
