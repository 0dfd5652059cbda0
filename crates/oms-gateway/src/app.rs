//! Main application orchestration.
//!
//! Coordinates all components:
//! - Session logon/logout
//! - Order manager lifecycle
//! - Feed line parsing and routing to `on_data` / `on_response`
//! - Metrics summary on shutdown

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};

use oms_core::{LocalClock, WallClock};
use oms_engine::{DynSession, DynTransport, LoggingSession, LoggingTransport, OrderManager};
use oms_telemetry::Metrics;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::feed::{parse_line, FeedMessage};

/// Why the input loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputEnd {
    /// EOF on the line source.
    Closed,
    /// Ctrl-C.
    Interrupted,
}

/// Main application.
pub struct Application {
    config: AppConfig,
    manager: Arc<OrderManager>,
}

impl Application {
    /// Create an application using the local wall clock and logging
    /// collaborators.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let session = Arc::new(LoggingSession::new(config.session.username.clone()));
        Self::with_parts(config, Arc::new(LocalClock), Arc::new(LoggingTransport), session)
    }

    /// Create an application with explicit collaborators.
    pub fn with_parts(
        config: AppConfig,
        clock: Arc<dyn WallClock>,
        transport: DynTransport,
        session: DynSession,
    ) -> AppResult<Self> {
        config.validate()?;
        let manager = OrderManager::new(config.manager_config(), clock, transport, session)?;

        Ok(Self {
            config,
            manager: Arc::new(manager),
        })
    }

    #[must_use]
    pub fn manager(&self) -> &Arc<OrderManager> {
        &self.manager
    }

    /// Run against standard input until EOF or Ctrl-C.
    pub async fn run(self) -> AppResult<()> {
        self.run_with(BufReader::new(tokio::io::stdin())).await
    }

    /// Run against any line source.
    ///
    /// On EOF the queue is drained at the configured rate before shutdown;
    /// Ctrl-C shuts down immediately. A read error also shuts down
    /// immediately and is returned once shutdown has completed.
    pub async fn run_with<R>(self, input: R) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
    {
        info!(
            window = %self.config.window,
            max_orders_per_interval = self.config.dispatch.max_orders_per_interval,
            interval_ms = self.config.dispatch.interval_ms,
            "Starting application"
        );

        self.manager.send_logon();
        self.manager.start();

        let read_result = self.read_feed(input).await;

        if let Ok(InputEnd::Closed) = read_result {
            self.drain_queue().await;
        }

        self.shutdown().await?;
        read_result?;
        Ok(())
    }

    /// Feed lines to the order manager until EOF, Ctrl-C or a read error.
    async fn read_feed<R>(&self, mut input: R) -> std::io::Result<InputEnd>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();
        let mut line_count = 0u64;

        loop {
            buf.clear();
            let read = tokio::select! {
                read = input.read_until(b'\n', &mut buf) => read,

                // Handle shutdown signal
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    return Ok(InputEnd::Interrupted);
                }
            };

            match read {
                Ok(0) => {
                    info!(line_count, "Input closed");
                    return Ok(InputEnd::Closed);
                }
                Ok(_) => {
                    line_count += 1;
                    self.handle_raw_line(line_count, &buf);
                }
                Err(e) => {
                    error!(line_count, error = %e, "Failed to read input");
                    return Err(e);
                }
            }
        }
    }

    /// Decode one raw line; lines that are not UTF-8 are skipped.
    fn handle_raw_line(&self, line_no: u64, raw: &[u8]) {
        match std::str::from_utf8(raw) {
            Ok(line) => self.handle_line(line_no, line),
            Err(e) => warn!(line_no, error = %e, "Skipping line that is not valid UTF-8"),
        }
    }

    /// Route one feed line to the order manager.
    fn handle_line(&self, line_no: u64, line: &str) {
        match parse_line(line) {
            Ok(Some(FeedMessage::Order(request))) => {
                let outcome = self.manager.on_data(request);
                debug!(line_no, %outcome, "Order instruction handled");
            }
            Ok(Some(FeedMessage::Response(response))) => {
                self.manager.on_response(response);
            }
            Ok(None) => {}
            Err(e) => warn!(line_no, error = %e, "Skipping malformed line"),
        }
    }

    /// Wait until the dispatcher has released every queued order.
    async fn drain_queue(&self) {
        let interval = self.manager.dispatcher().interval();
        while !self.manager.queue().is_empty() {
            info!(remaining = self.manager.queue().len(), "Draining order queue");
            tokio::select! {
                () = tokio::time::sleep(interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received while draining");
                    break;
                }
            }
        }
    }

    async fn shutdown(&self) -> AppResult<()> {
        let remaining = self.manager.stop().await?;
        if remaining > 0 {
            let discarded = self.manager.queue().clear();
            warn!(discarded, "Discarding unsent orders");
        }
        self.manager.send_logout();

        info!(
            dispatched = self.manager.tracker().sent_count(),
            responses = self.manager.tracker().log_len(),
            "Shutting down"
        );
        match Metrics::gather_text() {
            Ok(text) => debug!(metrics = %text, "Final metrics"),
            Err(e) => warn!(error = %e, "Failed to render metrics"),
        }

        Ok(())
    }
}
