//! Order gateway application.
//!
//! Reads order instructions and exchange acknowledgements as JSON lines,
//! feeds them to the order management core and logs what it sends.

pub mod app;
pub mod config;
pub mod error;
pub mod feed;

pub use app::Application;
pub use config::{AdmissionConfig, AppConfig, SessionConfig};
pub use error::{AppError, AppResult};
pub use feed::{parse_line, FeedMessage};
