//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed feed message: {0}")]
    Feed(String),

    #[error("Core error: {0}")]
    Core(#[from] oms_core::CoreError),

    #[error("Engine error: {0}")]
    Engine(#[from] oms_engine::EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
