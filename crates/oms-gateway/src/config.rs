//! Application configuration.

use crate::error::{AppError, AppResult};
use chrono::NaiveTime;
use oms_core::TradingWindow;
use oms_engine::{DispatchConfig, ManagerConfig, UnmatchedCancelPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Admission configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// Handling of a cancel (price = 0, qty = 0) for an order that is not
    /// queued. Default: enqueue it as a new order.
    #[serde(default)]
    pub unmatched_cancel: UnmatchedCancelPolicy,
}

/// Exchange session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Username sent with logon/logout.
    #[serde(default = "default_username")]
    pub username: String,
}

fn default_username() -> String {
    "oms".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Trading window. Default: 10:00:00-13:00:00 local time.
    #[serde(default = "default_window")]
    pub window: TradingWindow,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub admission: AdmissionConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

fn default_window() -> TradingWindow {
    TradingWindow::new(
        NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
        NaiveTime::from_hms_opt(13, 0, 0).unwrap_or_default(),
    )
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            dispatch: DispatchConfig::default(),
            admission: AdmissionConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, falling back to defaults if the file
    /// does not exist.
    pub fn load(path: &str) -> AppResult<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::warn!(path = %path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        Self::from_toml(&content)
    }

    /// Parse from TOML text.
    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Check values the engine cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        self.window
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;
        self.dispatch
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;
        if self.session.username.trim().is_empty() {
            return Err(AppError::Config("session.username is empty".to_string()));
        }
        Ok(())
    }

    /// Engine configuration derived from this file.
    #[must_use]
    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            window: self.window,
            dispatch: self.dispatch.clone(),
            unmatched_cancel: self.admission.unmatched_cancel,
        }
    }
}
