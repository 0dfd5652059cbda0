//! Line-delimited JSON feed messages.
//!
//! One message per line, tagged by `type`:
//!
//! ```text
//! {"type":"order","order_id":1,"symbol_id":101,"price":"50.5","qty":10,"side":"B"}
//! {"type":"response","order_id":1,"kind":"accept"}
//! ```

use serde::{Deserialize, Serialize};

use oms_core::{OrderRequest, OrderResponse};

use crate::error::{AppError, AppResult};

/// Inbound feed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedMessage {
    /// New, modify or cancel instruction.
    Order(OrderRequest),
    /// Exchange acknowledgement.
    Response(OrderResponse),
}

/// Parse one feed line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> AppResult<Option<FeedMessage>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let message: FeedMessage =
        serde_json::from_str(line).map_err(|e| AppError::Feed(e.to_string()))?;
    if let FeedMessage::Order(ref request) = message {
        request.validate()?;
    }
    Ok(Some(message))
}
