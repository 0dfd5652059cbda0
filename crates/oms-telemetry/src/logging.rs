//! Structured logging initialization.

use crate::error::{TelemetryError, TelemetryResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,oms=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, for log shipping.
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

impl LogFormat {
    /// `Json` when `RUST_ENV=production`, `Pretty` otherwise.
    #[must_use]
    pub fn from_env() -> Self {
        Self::for_environment(std::env::var("RUST_ENV").ok().as_deref())
    }

    fn for_environment(rust_env: Option<&str>) -> Self {
        match rust_env {
            Some("production") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Initialize structured logging in the format selected by `RUST_ENV`.
pub fn init_logging() -> TelemetryResult<()> {
    init_logging_with(LogFormat::from_env())
}

/// Install the global subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_logging_with(format: LogFormat) -> TelemetryResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_names(true),
            )
            .try_init(),
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn test_format_selection() {
        assert_eq!(LogFormat::for_environment(Some("production")), LogFormat::Json);
        assert_eq!(LogFormat::for_environment(Some("staging")), LogFormat::Pretty);
        assert_eq!(LogFormat::for_environment(None), LogFormat::Pretty);
    }

    #[test]
    fn test_second_init_is_an_error() {
        // The global subscriber can only be installed once per process.
        let _ = init_logging_with(LogFormat::Pretty);
        assert!(matches!(
            init_logging_with(LogFormat::Json),
            Err(TelemetryError::LoggingInit(_))
        ));
    }
}
