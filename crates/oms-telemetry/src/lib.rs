//! Prometheus metrics and structured logging for the order management core.
//!
//! Provides observability for every admission and response outcome:
//! - Prometheus metrics for admissions, queue depth, dispatch and ack latency
//! - Structured JSON logging with tracing

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, init_logging_with, LogFormat};
pub use metrics::Metrics;
