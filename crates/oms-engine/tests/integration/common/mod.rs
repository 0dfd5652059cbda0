//! Shared fixtures for engine integration tests.

use std::sync::Arc;

use chrono::NaiveTime;
use rust_decimal::Decimal;

use oms_core::{
    FixedClock, OrderId, OrderRequest, OrderSide, Price, Quantity, SymbolId, TradingWindow,
};
use oms_engine::{
    DispatchConfig, ManagerConfig, MockSession, MockTransport, OrderManager,
    UnmatchedCancelPolicy,
};

/// Manager wired to recording collaborators.
pub struct Harness {
    pub manager: Arc<OrderManager>,
    pub transport: Arc<MockTransport>,
    pub session: Arc<MockSession>,
}

pub fn window(start: (u32, u32), end: (u32, u32)) -> TradingWindow {
    TradingWindow::new(
        NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
    )
}

/// Window 10:00-13:00, cap 2 per second, clock pinned at `now`.
pub fn harness_at(now: (u32, u32)) -> Harness {
    harness_with(window((10, 0), (13, 0)), now, UnmatchedCancelPolicy::Enqueue)
}

pub fn harness_with(
    trading_window: TradingWindow,
    now: (u32, u32),
    unmatched_cancel: UnmatchedCancelPolicy,
) -> Harness {
    let transport = Arc::new(MockTransport::new());
    let session = Arc::new(MockSession::new());
    let config = ManagerConfig {
        window: trading_window,
        dispatch: DispatchConfig {
            max_orders_per_interval: 2,
            interval_ms: 1_000,
            send_timeout_ms: 1_000,
        },
        unmatched_cancel,
    };
    let manager = OrderManager::new(
        config,
        Arc::new(FixedClock::at(now.0, now.1)),
        transport.clone(),
        session.clone(),
    )
    .unwrap();

    Harness {
        manager: Arc::new(manager),
        transport,
        session,
    }
}

pub fn order(id: u64, price: Decimal, qty: u64) -> OrderRequest {
    OrderRequest::new(
        OrderId::new(id),
        SymbolId::new(101),
        Price::new(price),
        Quantity::new(qty),
        OrderSide::Buy,
    )
}

pub fn cancel(id: u64) -> OrderRequest {
    OrderRequest::cancel(OrderId::new(id), SymbolId::new(101), OrderSide::Buy)
}

pub fn ids(orders: &[OrderRequest]) -> Vec<u64> {
    orders.iter().map(|o| o.order_id.value()).collect()
}
