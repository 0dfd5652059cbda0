//! Order management engine.
//!
//! Admits inbound order instructions during the trading window, reconciles
//! them against the queue of orders not yet sent, and releases queued orders
//! to the exchange at a bounded rate.
//!
//! # Key Components
//!
//! - [`OrderManager`]: Facade exposing `on_data`, `on_response`, logon/logout
//! - [`OrderQueue`]: FIFO queue with in-place modify and cancel by order id
//! - [`Dispatcher`]: Interval loop sending at most N orders per interval
//! - [`ResponseTracker`]: Send timestamps and acknowledgement latency log
//! - [`OrderTransport`] / [`SessionControl`]: Outbound collaborators
//!
//! # Admission (in `OrderManager::on_data`)
//!
//! 1. Window closed -> Rejected::OutsideWindow
//! 2. Queued match + price = qty = 0 -> Cancelled
//! 3. Queued match -> Modified (price and qty overwritten in place)
//! 4. No match -> Queued at the tail (cancel-shaped subject to policy)

pub mod dispatcher;
pub mod error;
pub mod manager;
pub mod queue;
pub mod tracker;
pub mod transport;

// Dispatch loop
pub use dispatcher::{DispatchConfig, DispatchReport, Dispatcher, DispatcherHandle};

// Error types
pub use error::{EngineError, EngineResult};

// Facade
pub use manager::{ManagerConfig, OrderManager};

// Queue and tracking
pub use queue::{OrderQueue, UnmatchedCancelPolicy};
pub use tracker::ResponseTracker;

// Collaborators
pub use transport::{
    BoxFuture, DynSession, DynTransport, LoggingSession, LoggingTransport, MockSession,
    MockTransport, OrderTransport, SendResult, SessionControl,
};
