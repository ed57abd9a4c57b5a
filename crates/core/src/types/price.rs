//! Type-safe price representation using decimal arithmetic.
//!
//! Shopify returns money amounts as decimal strings (`"19.9"`), but cached or
//! hand-built payloads sometimes carry plain JSON numbers. [`Price`] accepts
//! both and always displays with exactly two decimals, rounding half away from
//! zero.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Amount shown when a price is missing or cannot be read.
pub const ZERO_PRICE: &str = "0.00";

/// Errors produced while reading an upstream amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    /// The amount was neither a string nor a number.
    #[error("unsupported amount type: {0}")]
    UnsupportedType(String),

    /// The amount text is not a decimal number.
    #[error("invalid amount: {0}")]
    Invalid(String),
}

/// A monetary amount in the currency's standard unit (e.g., dollars, not cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Decimal amount.
    pub amount: Decimal,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self { amount }
    }

    /// Parse an upstream amount (`"19.9"` or `19.9`).
    ///
    /// # Errors
    ///
    /// Returns `PriceError` if the value is not a string or number, or does
    /// not hold a decimal number.
    pub fn from_value(value: &Value) -> Result<Self, PriceError> {
        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            other => return Err(PriceError::UnsupportedType(other.to_string())),
        };

        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map(Self::new)
            .map_err(|_| PriceError::Invalid(text))
    }

    /// Format with two decimals, e.g. `19.90`.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{rounded:.2}")
    }
}

/// Format an optional upstream amount for display.
///
/// A missing amount, an empty string, the literal `"0.0"` that Shopify uses
/// for free variants, and any unreadable value all render as `0.00`.
#[must_use]
pub fn display_amount(amount: Option<&Value>) -> String {
    match amount {
        None | Some(Value::Null | Value::Bool(false)) => ZERO_PRICE.to_string(),
        Some(Value::String(s)) if s.is_empty() || s == "0.0" => ZERO_PRICE.to_string(),
        Some(value) => Price::from_value(value)
            .map_or_else(|_| ZERO_PRICE.to_string(), |price| price.display()),
    }
}
