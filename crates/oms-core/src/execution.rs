//! Execution-related types for the order queue lifecycle.
//!
//! This module provides types for:
//! - Admission outcomes returned by the reconciler
//! - Response log records with round-trip latency

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::order::{OrderId, ResponseKind};

// ============================================================================
// Admission Types
// ============================================================================

/// Reason for rejecting an inbound instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    /// Trading window is closed.
    OutsideWindow,
    /// Cancel-shaped instruction with no queued order to cancel, and the
    /// unmatched-cancel policy is set to reject.
    UnmatchedCancel,
}

impl RejectReason {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutsideWindow => "outside_window",
            Self::UnmatchedCancel => "unmatched_cancel",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of admitting an inbound instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdmissionOutcome {
    /// Appended to the tail of the queue as a new order.
    Queued,
    /// Price and quantity of the queued order were overwritten in place.
    Modified,
    /// Queued order was removed without being dispatched.
    Cancelled,
    /// Instruction was dropped; the queue is unchanged.
    Rejected(RejectReason),
}

impl AdmissionOutcome {
    /// Returns true if the instruction changed the queue.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }

    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Modified => "modified",
            Self::Cancelled => "cancelled",
            Self::Rejected(RejectReason::OutsideWindow) => "rejected_outside_window",
            Self::Rejected(RejectReason::UnmatchedCancel) => "rejected_unmatched_cancel",
        }
    }
}

impl fmt::Display for AdmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Response Log Types
// ============================================================================

/// Immutable response log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Acknowledgement kind.
    pub kind: ResponseKind,
    /// Acknowledged order.
    pub order_id: OrderId,
    /// Time between dispatch and acknowledgement.
    pub latency: Duration,
}

impl ResponseRecord {
    #[must_use]
    pub fn new(kind: ResponseKind, order_id: OrderId, latency: Duration) -> Self {
        Self {
            kind,
            order_id,
            latency,
        }
    }

    /// Latency in fractional milliseconds.
    #[must_use]
    pub fn latency_ms(&self) -> f64 {
        self.latency.as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_outcome_accepted() {
        assert!(AdmissionOutcome::Queued.is_accepted());
        assert!(AdmissionOutcome::Modified.is_accepted());
        assert!(AdmissionOutcome::Cancelled.is_accepted());
        assert!(!AdmissionOutcome::Rejected(RejectReason::OutsideWindow).is_accepted());
    }

    #[test]
    fn test_admission_outcome_labels() {
        assert_eq!(AdmissionOutcome::Queued.to_string(), "queued");
        assert_eq!(
            AdmissionOutcome::Rejected(RejectReason::OutsideWindow).to_string(),
            "rejected_outside_window"
        );
    }

    #[test]
    fn test_response_record_latency_ms() {
        let record = ResponseRecord::new(
            ResponseKind::Accept,
            OrderId::new(1),
            Duration::from_micros(1500),
        );
        assert!((record.latency_ms() - 1.5).abs() < f64::EPSILON);
    }
}
