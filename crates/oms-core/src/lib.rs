//! Core domain types for the gateway order management core.
//!
//! This crate provides fundamental types used throughout the system:
//! - `OrderId`, `SymbolId`: Order and symbol identifiers
//! - `Price`, `Quantity`: Precision-safe numeric types
//! - `OrderRequest`, `OrderResponse`: Inbound instructions and acknowledgements
//! - `TradingWindow`: Time-of-day admission gate

pub mod decimal;
pub mod error;
pub mod execution;
pub mod order;
pub mod trading_window;

pub use decimal::{Price, Quantity};
pub use error::{CoreError, Result};
pub use execution::{AdmissionOutcome, RejectReason, ResponseRecord};
pub use order::{
    OrderId, OrderRequest, OrderResponse, OrderSide, RequestKind, ResponseKind, SymbolId,
};
pub use trading_window::{FixedClock, LocalClock, TradingWindow, WallClock};
