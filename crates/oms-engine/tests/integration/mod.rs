//! Integration tests for oms-engine.
//!
//! These tests drive the public `OrderManager` facade end to end:
//! - Admission through the trading window gate
//! - Reconciliation against the queue
//! - Rate-limited dispatch and response correlation

pub mod common;
