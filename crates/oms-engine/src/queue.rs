//! Order queue and reconciliation.
//!
//! This module implements the queue of admitted, not-yet-dispatched orders
//! and the reconciliation of inbound instructions against it. Key features:
//!
//! - FIFO dispatch order by admission sequence
//! - At most one entry per order id
//! - In-place modify (price/quantity only, position preserved)
//! - Cancel removes the queued entry without dispatch
//!
//! # Thread Safety
//!
//! All queue state sits behind a single `parking_lot::Mutex`. Reconciliation
//! (lookup + mutate) and batch removal are the only critical sections; no I/O
//! happens while the lock is held.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use oms_core::{AdmissionOutcome, OrderId, OrderRequest, RejectReason, RequestKind};
use oms_telemetry::Metrics;

// ============================================================================
// UnmatchedCancelPolicy
// ============================================================================

/// What to do with a cancel-shaped instruction (price = 0, qty = 0) whose
/// order id has no queued match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedCancelPolicy {
    /// Append it as a new (degenerate) order.
    #[default]
    Enqueue,
    /// Drop it; the queue is left unchanged.
    Reject,
}

// ============================================================================
// QueueState
// ============================================================================

/// Entries keyed by admission sequence, plus an id index.
///
/// The sequence number of an entry never changes, so a modify keeps the
/// entry's dispatch position.
#[derive(Debug, Default)]
struct QueueState {
    entries: BTreeMap<u64, OrderRequest>,
    index: HashMap<OrderId, u64>,
    next_seq: u64,
}

impl QueueState {
    fn reconcile(
        &mut self,
        request: OrderRequest,
        policy: UnmatchedCancelPolicy,
    ) -> AdmissionOutcome {
        let order_id = request.order_id;
        let kind = RequestKind::classify(&request, self.index.contains_key(&order_id));

        match kind {
            RequestKind::Cancel => {
                if let Some(seq) = self.index.remove(&order_id) {
                    self.entries.remove(&seq);
                }
                AdmissionOutcome::Cancelled
            }
            RequestKind::Modify => {
                if let Some(&seq) = self.index.get(&order_id) {
                    if let Some(entry) = self.entries.get_mut(&seq) {
                        entry.price = request.price;
                        entry.qty = request.qty;
                    }
                }
                AdmissionOutcome::Modified
            }
            RequestKind::New => {
                if request.is_cancel_shaped() && policy == UnmatchedCancelPolicy::Reject {
                    return AdmissionOutcome::Rejected(RejectReason::UnmatchedCancel);
                }
                self.push_back(request);
                AdmissionOutcome::Queued
            }
        }
    }

    fn push_back(&mut self, request: OrderRequest) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(request.order_id, seq);
        self.entries.insert(seq, request);
    }

    fn pop_front(&mut self) -> Option<OrderRequest> {
        let (_, order) = self.entries.pop_first()?;
        self.index.remove(&order.order_id);
        Some(order)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// ============================================================================
// OrderQueue
// ============================================================================

/// Queue of admitted orders waiting for dispatch.
#[derive(Debug, Default)]
pub struct OrderQueue {
    state: Mutex<QueueState>,
}

impl OrderQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile an inbound instruction against the queued orders.
    ///
    /// - Queued match + cancel-shaped: remove the match, `Cancelled`
    /// - Queued match otherwise: overwrite price and qty, `Modified`
    /// - No match: append at the tail, `Queued`, unless the instruction is
    ///   cancel-shaped and `policy` is `Reject`
    ///
    /// The incoming instruction itself is never enqueued as a duplicate.
    pub fn reconcile(
        &self,
        request: OrderRequest,
        policy: UnmatchedCancelPolicy,
    ) -> AdmissionOutcome {
        let order_id = request.order_id;
        let (outcome, depth) = {
            let mut state = self.state.lock();
            let outcome = state.reconcile(request, policy);
            (outcome, state.len())
        };

        debug!(%order_id, %outcome, depth, "reconciled");
        Metrics::queue_depth(depth);
        outcome
    }

    /// Remove up to `max` orders from the front of the queue.
    ///
    /// Returns the removed orders in FIFO order and the number left queued.
    #[must_use]
    pub fn drain_batch(&self, max: usize) -> (Vec<OrderRequest>, usize) {
        let (batch, remaining) = {
            let mut state = self.state.lock();
            let batch_size = state.len().min(max);
            let mut batch = Vec::with_capacity(batch_size);
            while batch.len() < batch_size {
                match state.pop_front() {
                    Some(order) => batch.push(order),
                    None => break,
                }
            }
            (batch, state.len())
        };

        Metrics::queue_depth(remaining);
        (batch, remaining)
    }

    /// Get a copy of the queued order with this id.
    #[must_use]
    pub fn get(&self, order_id: OrderId) -> Option<OrderRequest> {
        let state = self.state.lock();
        state
            .index
            .get(&order_id)
            .and_then(|seq| state.entries.get(seq))
            .cloned()
    }

    /// Check whether an order with this id is queued.
    #[must_use]
    pub fn contains(&self, order_id: OrderId) -> bool {
        self.state.lock().index.contains_key(&order_id)
    }

    /// Copy of all queued orders in dispatch order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<OrderRequest> {
        self.state.lock().entries.values().cloned().collect()
    }

    /// Number of queued orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every queued order, returning how many were removed.
    ///
    /// Only meant for shutdown, after the dispatcher has stopped.
    pub fn clear(&self) -> usize {
        let removed = {
            let mut state = self.state.lock();
            let removed = state.len();
            state.entries.clear();
            state.index.clear();
            removed
        };
        Metrics::queue_depth(0);
        removed
    }
}

// ============================================================================
// Tests
// ============================================================================
