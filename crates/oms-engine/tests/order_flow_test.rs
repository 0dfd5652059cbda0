//! Order flow integration tests.
//!
//! Tests the full path through the order manager:
//! - Window gating and reconciliation
//! - Dispatch cap and FIFO order across intervals
//! - Response latency log and unmatched responses

mod integration;
use integration::common::{cancel, harness_at, harness_with, ids, order, window};

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use oms_core::{
    AdmissionOutcome, OrderId, OrderResponse, Price, Quantity, RejectReason, ResponseKind,
};
use oms_engine::UnmatchedCancelPolicy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio_test::assert_ok;

/// Modify overwrites price and quantity of the queued order.
#[test]
fn test_modify_queued_order() {
    let h = harness_at((11, 0));

    h.manager.on_data(order(1, dec!(50.5), 10));
    let outcome = h.manager.on_data(order(1, dec!(55.0), 15));

    assert_eq!(outcome, AdmissionOutcome::Modified);
    let queued = h.manager.queue().snapshot();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].price, Price::new(dec!(55.0)));
    assert_eq!(queued[0].qty, Quantity::new(15));
}

/// Cancel removes the queued order.
#[test]
fn test_cancel_queued_order() {
    let h = harness_at((11, 0));

    h.manager.on_data(order(1, dec!(50.5), 10));
    let outcome = h.manager.on_data(cancel(1));

    assert_eq!(outcome, AdmissionOutcome::Cancelled);
    assert_eq!(h.manager.queue().len(), 0);
}

/// Orders outside the window are rejected and leave the queue untouched.
#[test]
fn test_outside_window_rejected() {
    let h = harness_with(
        window((15, 0), (16, 0)),
        (11, 0),
        UnmatchedCancelPolicy::Enqueue,
    );

    let outcome = h.manager.on_data(order(101, dec!(10), 1));

    assert_eq!(outcome, AdmissionOutcome::Rejected(RejectReason::OutsideWindow));
    assert_eq!(h.manager.queue().len(), 0);
}

/// Outside the window, cancels and modifies are rejected too.
#[test]
fn test_outside_window_does_not_touch_existing_entries() {
    let h = harness_at((11, 0));
    h.manager.on_data(order(1, dec!(50.5), 10));
    h.manager.on_data(order(2, dec!(50.5), 10));
    let before = h.manager.queue().snapshot();

    h.manager.set_window(window((15, 0), (16, 0))).unwrap();
    h.manager.on_data(cancel(1));
    h.manager.on_data(order(2, dec!(99), 99));
    h.manager.on_data(order(3, dec!(1), 1));

    assert_eq!(h.manager.queue().snapshot(), before);
}

/// Cancel removes exactly the matching entry and keeps the others in order.
#[test]
fn test_cancel_removes_only_match() {
    let h = harness_at((11, 0));
    for id in 1..=4 {
        h.manager.on_data(order(id, dec!(50.5), 10));
    }

    h.manager.on_data(cancel(3));

    assert_eq!(ids(&h.manager.queue().snapshot()), vec![1, 2, 4]);
}

/// Unmatched cancel becomes a degenerate new order by default.
#[test]
fn test_unmatched_cancel_enqueued_by_default() {
    let h = harness_at((11, 0));

    let outcome = h.manager.on_data(cancel(42));

    assert_eq!(outcome, AdmissionOutcome::Queued);
    assert!(h.manager.queue().contains(OrderId::new(42)));
}

/// Concurrent producers never create two entries for the same id.
#[test]
fn test_concurrent_admission_one_entry_per_id() {
    let h = harness_at((11, 0));

    let producers: Vec<_> = (0..4u64)
        .map(|worker| {
            let manager = Arc::clone(&h.manager);
            thread::spawn(move || {
                for round in 0..200u64 {
                    let price = dec!(50) + Decimal::from(worker);
                    manager.on_data(order(round % 10, price, 1 + round));
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    let snapshot = h.manager.queue().snapshot();
    let mut seen = ids(&snapshot);
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), snapshot.len());
    assert_eq!(snapshot.len(), 10);
}

/// One interval with cap 2 and 3 queued orders sends 2 and keeps 1.
#[tokio::test(start_paused = true)]
async fn test_one_interval_respects_cap() {
    let h = harness_at((11, 0));
    for id in 1..=3 {
        h.manager.on_data(order(id, dec!(50.5), 10));
    }

    let report = h.manager.dispatcher().tick().await;

    assert_eq!(report.dispatched(), 2);
    assert_eq!(h.manager.queue().len(), 1);
    assert_eq!(ids(&h.transport.get_sends()), vec![1, 2]);
    assert!(h.manager.tracker().sent_at(OrderId::new(1)).is_some());
    assert!(h.manager.tracker().sent_at(OrderId::new(2)).is_some());
}

/// The running loop releases at most the cap per interval, in FIFO order.
#[tokio::test(start_paused = true)]
async fn test_running_loop_fifo_and_cap() {
    let h = harness_at((11, 0));
    for id in 1..=5 {
        h.manager.on_data(order(id, dec!(50.5), 10));
    }

    h.manager.start();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(h.transport.get_sends().len(), 2);

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(h.transport.get_sends().len(), 4);

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(ids(&h.transport.get_sends()), vec![1, 2, 3, 4, 5]);

    let remaining = assert_ok!(h.manager.stop().await);
    assert_eq!(remaining, 0);
}

/// A modify keeps the order's dispatch position.
#[tokio::test(start_paused = true)]
async fn test_modified_order_keeps_position() {
    let h = harness_at((11, 0));
    for id in 1..=3 {
        h.manager.on_data(order(id, dec!(50.5), 10));
    }
    h.manager.on_data(order(1, dec!(60), 20));

    h.manager.dispatcher().tick().await;

    let sends = h.transport.get_sends();
    assert_eq!(ids(&sends), vec![1, 2]);
    assert_eq!(sends[0].price, Price::new(dec!(60)));
}

/// Acknowledgement latency is measured from the send timestamp.
#[tokio::test(start_paused = true)]
async fn test_response_latency_logged() {
    let h = harness_at((11, 0));
    h.manager.on_data(order(1, dec!(50.5), 10));
    h.manager.dispatcher().tick().await;

    tokio::time::advance(Duration::from_millis(40)).await;
    let record = h
        .manager
        .on_response(OrderResponse::new(OrderId::new(1), ResponseKind::Accept))
        .unwrap();

    assert_eq!(record.kind, ResponseKind::Accept);
    assert_eq!(record.order_id, OrderId::new(1));
    assert_eq!(record.latency, Duration::from_millis(40));
    assert_eq!(h.manager.tracker().log_len(), 1);
}

/// Responses for never-dispatched ids are not logged.
#[tokio::test]
async fn test_unmatched_response_not_logged() {
    let h = harness_at((11, 0));
    h.manager.on_data(order(1, dec!(50.5), 10));
    h.manager.dispatcher().tick().await;

    let record = h
        .manager
        .on_response(OrderResponse::new(OrderId::new(999), ResponseKind::Accept));

    assert!(record.is_none());
    assert_eq!(h.manager.tracker().log_len(), 0);
}

/// A queued but undispatched order has no timestamp, so its response is unmatched.
#[test]
fn test_response_before_dispatch_not_logged() {
    let h = harness_at((11, 0));
    h.manager.on_data(order(1, dec!(50.5), 10));

    let record = h
        .manager
        .on_response(OrderResponse::new(OrderId::new(1), ResponseKind::Accept));

    assert!(record.is_none());
    assert_eq!(h.manager.tracker().log_len(), 0);
}

/// Stop leaves undispatched orders queued and nothing is sent afterwards.
#[tokio::test(start_paused = true)]
async fn test_stop_is_deterministic() {
    let h = harness_at((11, 0));
    for id in 1..=3 {
        h.manager.on_data(order(id, dec!(50.5), 10));
    }
    h.manager.send_logon();
    h.manager.start();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let remaining = assert_ok!(h.manager.stop().await);
    h.manager.send_logout();
    assert_eq!(remaining, 1);
    assert!(!h.manager.is_running());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(h.transport.get_sends().len(), 2);
    assert_eq!(h.session.logons(), 1);
    assert_eq!(h.session.logouts(), 1);
}
