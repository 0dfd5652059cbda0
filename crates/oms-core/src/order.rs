//! Order-related types and identifiers.
//!
//! Provides order identifiers, side, the inbound order instruction and the
//! exchange acknowledgement types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::{Price, Quantity};

/// Order identifier.
///
/// Unique per logical order and stable across modify/cancel instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl OrderId {
    #[inline]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Symbol identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u32);

impl SymbolId {
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order side: buy or sell.
///
/// Upstream feeds send single-letter codes, so `"B"` and `"S"` are accepted
/// as aliases when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    #[serde(alias = "B", alias = "b")]
    Buy,
    #[serde(alias = "S", alias = "s")]
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// An order instruction from upstream.
///
/// The same shape carries new, modify and cancel instructions; which one it
/// is depends on whether a queued order with the same id exists and on
/// whether price and quantity are both zero. See [`RequestKind::classify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub order_id: OrderId,
    pub symbol_id: SymbolId,
    pub price: Price,
    pub qty: Quantity,
    pub side: OrderSide,
}

impl OrderRequest {
    #[must_use]
    pub fn new(
        order_id: OrderId,
        symbol_id: SymbolId,
        price: Price,
        qty: Quantity,
        side: OrderSide,
    ) -> Self {
        Self {
            order_id,
            symbol_id,
            price,
            qty,
            side,
        }
    }

    /// Cancel instruction for `order_id` (price and quantity both zero).
    #[must_use]
    pub fn cancel(order_id: OrderId, symbol_id: SymbolId, side: OrderSide) -> Self {
        Self::new(order_id, symbol_id, Price::ZERO, Quantity::ZERO, side)
    }

    /// Returns true if price and quantity are both zero.
    #[inline]
    pub fn is_cancel_shaped(&self) -> bool {
        self.price.is_zero() && self.qty.is_zero()
    }

    /// Reject instructions that no venue would accept.
    pub fn validate(&self) -> Result<()> {
        if self.price.is_negative() {
            return Err(CoreError::InvalidPrice(format!(
                "order {}: negative price {}",
                self.order_id, self.price
            )));
        }
        Ok(())
    }
}

/// Kind of an inbound instruction, derived at reconciliation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    New,
    Modify,
    Cancel,
}

impl RequestKind {
    /// Classify a request given whether a queued order shares its id.
    ///
    /// A cancel-shaped request without a queued match is still `New`.
    #[must_use]
    pub fn classify(request: &OrderRequest, has_queued_match: bool) -> Self {
        match (has_queued_match, request.is_cancel_shaped()) {
            (false, _) => Self::New,
            (true, true) => Self::Cancel,
            (true, false) => Self::Modify,
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Modify => write!(f, "modify"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

/// Kind of an exchange acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    #[default]
    Unknown,
    Accept,
    Reject,
}

impl ResponseKind {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Accept => "accept",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exchange acknowledgement for a dispatched order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub order_id: OrderId,
    pub kind: ResponseKind,
}

impl OrderResponse {
    #[must_use]
    pub fn new(order_id: OrderId, kind: ResponseKind) -> Self {
        Self { order_id, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_request(price: Price, qty: u64) -> OrderRequest {
        OrderRequest::new(
            OrderId::new(1),
            SymbolId::new(101),
            price,
            Quantity::new(qty),
            OrderSide::Buy,
        )
    }

    #[test]
    fn test_order_side_accepts_letter_codes() {
        let buy: OrderSide = serde_json::from_str("\"B\"").unwrap();
        let sell: OrderSide = serde_json::from_str("\"S\"").unwrap();
        let long: OrderSide = serde_json::from_str("\"sell\"").unwrap();

        assert_eq!(buy, OrderSide::Buy);
        assert_eq!(sell, OrderSide::Sell);
        assert_eq!(long, OrderSide::Sell);
    }

    #[test]
    fn test_cancel_shape_requires_both_zero() {
        assert!(sample_request(Price::ZERO, 0).is_cancel_shaped());
        assert!(!sample_request(Price::ZERO, 10).is_cancel_shaped());
        assert!(!sample_request(Price::new(dec!(50.5)), 0).is_cancel_shaped());
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        assert!(sample_request(Price::new(dec!(-1)), 10).validate().is_err());
        assert!(sample_request(Price::ZERO, 0).validate().is_ok());
        assert!(sample_request(Price::new(dec!(50.5)), 10).validate().is_ok());
    }

    #[test]
    fn test_classify() {
        let order = sample_request(Price::new(dec!(50.5)), 10);
        let cancel = sample_request(Price::ZERO, 0);

        assert_eq!(RequestKind::classify(&order, false), RequestKind::New);
        assert_eq!(RequestKind::classify(&order, true), RequestKind::Modify);
        assert_eq!(RequestKind::classify(&cancel, true), RequestKind::Cancel);
        // Unmatched cancel-shaped request is a (degenerate) new order
        assert_eq!(RequestKind::classify(&cancel, false), RequestKind::New);
    }

    #[test]
    fn test_response_deserialize() {
        let response: OrderResponse =
            serde_json::from_str(r#"{"order_id":1,"kind":"accept"}"#).unwrap();
        assert_eq!(response.order_id, OrderId::new(1));
        assert_eq!(response.kind, ResponseKind::Accept);
    }
}
