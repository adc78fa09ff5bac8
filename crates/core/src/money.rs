//! Money primitives.
//!
//! Balances are plain [`Decimal`]s with two fractional digits; [`Amount`] is the
//! strictly positive quantity moved by a single deposit or withdrawal.

use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{DomainError, DomainResult};

/// Number of fractional digits kept for every monetary value.
pub const MONEY_SCALE: u32 = 2;

/// Upper bound for a single amount and for any balance: 10^15.
///
/// Stays well inside the `NUMERIC(20,2)` balance column.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// A strictly positive monetary amount, rounded to cents.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Round `value` to cents and require the result to be positive and at
    /// most [`MAX_AMOUNT`].
    pub fn new(value: Decimal) -> DomainResult<Self> {
        let rounded = round_money(value);
        if rounded <= Decimal::ZERO {
            return Err(DomainError::validation(
                "amount must be a number greater than zero",
            ));
        }
        if rounded > MAX_AMOUNT {
            return Err(DomainError::validation(format!(
                "amount must not exceed {}",
                format_money(MAX_AMOUNT)
            )));
        }
        Ok(Self(rounded))
    }

    /// Parse a user-supplied string such as `"100"` or `" 12.5 "`.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("amount is required"));
        }
        Self::new(parse_decimal(trimmed)?)
    }

    /// Interpret a JSON request field. Numbers and numeric strings are accepted.
    pub fn from_json(value: &JsonValue) -> DomainResult<Self> {
        match value {
            JsonValue::Null => Err(DomainError::validation("amount is required")),
            JsonValue::Number(n) => Self::new(parse_decimal(&n.to_string())?),
            JsonValue::String(s) => Self::parse(s),
            _ => Err(DomainError::validation(
                "amount must be a number greater than zero",
            )),
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl FromStr for Amount {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&format_money(self.0))
    }
}

/// Round to cents, midpoint away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Render a monetary value with exactly two fractional digits (`"70.00"`).
pub fn format_money(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

fn parse_decimal(s: &str) -> DomainResult<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| DomainError::validation(format!("'{s}' is not a valid amount")))
}
