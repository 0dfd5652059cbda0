//! Error types for oms-engine.

use thiserror::Error;

/// Engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid dispatch configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid trading window: {0}")]
    InvalidWindow(#[from] oms_core::CoreError),

    #[error("Dispatcher task failed: {0}")]
    TaskJoin(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
