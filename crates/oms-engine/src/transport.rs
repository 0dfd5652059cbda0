//! Collaborator traits for the outbound transport and session control.
//!
//! The core never talks to the exchange directly. Orders leave through an
//! [`OrderTransport`]; logon and logout go through a [`SessionControl`].
//! Recording mocks of both live here for tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::info;

use oms_core::{OrderId, OrderRequest};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of a transport send operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendResult {
    /// Successfully handed to the exchange connection.
    Sent,
    /// Connection to the exchange is down.
    Disconnected,
    /// Send did not complete within the configured bound.
    TimedOut,
    /// Send failed with error.
    Error(String),
}

impl SendResult {
    /// Check if the send was successful.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, SendResult::Sent)
    }

    /// Label used in logs and metrics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            SendResult::Sent => "sent",
            SendResult::Disconnected => "disconnected",
            SendResult::TimedOut => "timed_out",
            SendResult::Error(_) => "error",
        }
    }
}

/// Trait for handing dispatched orders to the exchange.
///
/// Sends are fire-and-forget from the core's point of view: failures are
/// reported back through [`SendResult`] and are the transport's to handle.
pub trait OrderTransport: Send + Sync {
    /// Send one order.
    fn send(&self, order: OrderRequest) -> BoxFuture<'_, SendResult>;
}

/// Trait for session-level messages.
///
/// The core never depends on the outcome of these calls.
pub trait SessionControl: Send + Sync {
    fn send_logon(&self);
    fn send_logout(&self);
}

/// Arc wrapper for OrderTransport trait objects.
pub type DynTransport = Arc<dyn OrderTransport>;

/// Arc wrapper for SessionControl trait objects.
pub type DynSession = Arc<dyn SessionControl>;

// ============================================================================
// Logging implementations
// ============================================================================

/// Transport that only reports the hand-off.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTransport;

impl OrderTransport for LoggingTransport {
    fn send(&self, order: OrderRequest) -> BoxFuture<'_, SendResult> {
        Box::pin(async move {
            info!(
                order_id = %order.order_id,
                symbol_id = %order.symbol_id,
                side = %order.side,
                price = %order.price,
                qty = %order.qty,
                "Order sent to exchange"
            );
            SendResult::Sent
        })
    }
}

/// Session control that only reports logon/logout.
#[derive(Debug, Default, Clone)]
pub struct LoggingSession {
    username: String,
}

impl LoggingSession {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

impl SessionControl for LoggingSession {
    fn send_logon(&self) {
        info!(username = %self.username, "Logon message sent");
    }

    fn send_logout(&self) {
        info!(username = %self.username, "Logout message sent");
    }
}

// ============================================================================
// Mock implementations
// ============================================================================

/// Mock transport for testing.
#[derive(Debug)]
pub struct MockTransport {
    /// Recorded sends for verification.
    sends: Mutex<Vec<OrderRequest>>,
    /// Next result to return.
    next_result: Mutex<SendResult>,
    /// Artificial delay applied to every send.
    delay: Mutex<Option<Duration>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self {
            sends: Mutex::new(Vec::new()),
            next_result: Mutex::new(SendResult::Sent),
            delay: Mutex::new(None),
        }
    }

    /// Set the result returned by subsequent sends.
    pub fn set_next_result(&self, result: SendResult) {
        *self.next_result.lock() = result;
    }

    /// Delay every send by `delay` before recording it.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock() = delay;
    }

    /// Get recorded sends.
    pub fn get_sends(&self) -> Vec<OrderRequest> {
        self.sends.lock().clone()
    }

    /// Get recorded order ids in send order.
    pub fn sent_ids(&self) -> Vec<OrderId> {
        self.sends.lock().iter().map(|o| o.order_id).collect()
    }

    /// Clear recorded sends.
    pub fn clear_sends(&self) {
        self.sends.lock().clear();
    }
}

impl OrderTransport for MockTransport {
    fn send(&self, order: OrderRequest) -> BoxFuture<'_, SendResult> {
        Box::pin(async move {
            let delay = *self.delay.lock();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.sends.lock().push(order);
            self.next_result.lock().clone()
        })
    }
}

/// Mock session control counting logon/logout calls.
#[derive(Debug, Default)]
pub struct MockSession {
    logons: AtomicU32,
    logouts: AtomicU32,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logons(&self) -> u32 {
        self.logons.load(Ordering::SeqCst)
    }

    pub fn logouts(&self) -> u32 {
        self.logouts.load(Ordering::SeqCst)
    }
}

impl SessionControl for MockSession {
    fn send_logon(&self) {
        self.logons.fetch_add(1, Ordering::SeqCst);
    }

    fn send_logout(&self) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
    }
}
