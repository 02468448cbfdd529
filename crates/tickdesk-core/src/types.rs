//! Favorite position records and trade side.

use crate::error::{CoreError, Result};
use crate::symbol::Symbol;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of a tracked position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Buy,
    Sell,
}

impl Side {
    /// Uppercase wire/display form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }

    /// Lenient parse: anything that is not recognizably "sell" is a buy.
    pub fn parse_lenient(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("sell") {
            Self::Sell
        } else {
            Self::Buy
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-tracked position: symbol, quantity, side, and reference price.
///
/// The reference price is the user's cost basis; zero means "not set".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritePosition {
    pub symbol: Symbol,
    #[serde(rename = "qty")]
    pub quantity: Decimal,
    pub side: Side,
    #[serde(rename = "ref")]
    pub reference_price: Decimal,
}

impl FavoritePosition {
    /// Create a position, rejecting negative quantity or reference price.
    pub fn new(
        symbol: Symbol,
        quantity: Decimal,
        side: Side,
        reference_price: Decimal,
    ) -> Result<Self> {
        if quantity.is_sign_negative() {
            return Err(CoreError::InvalidQuantity(quantity.to_string()));
        }
        if reference_price.is_sign_negative() {
            return Err(CoreError::InvalidPrice(reference_price.to_string()));
        }
        Ok(Self {
            symbol,
            quantity,
            side,
            reference_price,
        })
    }

    /// Whether a reference price has been set.
    pub fn has_reference(&self) -> bool {
        !self.reference_price.is_zero()
    }
}
