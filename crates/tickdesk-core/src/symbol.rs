//! Validated trading pair symbol.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum accepted symbol length.
const MIN_LEN: usize = 3;
/// Maximum accepted symbol length.
const MAX_LEN: usize = 12;

/// A validated exchange symbol such as `BTCUSDT`.
///
/// Input is trimmed and uppercased before validation; the stored form
/// is always 3-12 uppercase ASCII alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and validate a raw symbol string.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(CoreError::InvalidSymbol("empty".to_string()));
        }
        let well_formed = (MIN_LEN..=MAX_LEN).contains(&normalized.len())
            && normalized
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
        if !well_formed {
            return Err(CoreError::InvalidSymbol(normalized));
        }
        Ok(Self(normalized))
    }

    /// The symbol as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let sym = Symbol::parse(" btcusdt ").unwrap();
        assert_eq!(sym.as_str(), "BTCUSDT");
    }

    #[test]
    fn test_parse_accepts_digits() {
        assert!(Symbol::parse("1000SHIBUSDT").is_ok()); // 12 chars, upper bound
        assert!(Symbol::parse("1000SHIBUSDTX").is_err()); // 13 chars
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Symbol::parse("").is_err());
        assert!(Symbol::parse("BT").is_err());
        assert!(Symbol::parse("BTC-USDT").is_err());
        assert!(Symbol::parse("VERYLONGSYMBOLNAME").is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let sym = Symbol::parse("ETHUSDT").unwrap();
        let json = serde_json::to_string(&sym).unwrap();
        assert_eq!(json, "\"ETHUSDT\"");
        let back: Symbol = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sym);
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        let res: std::result::Result<Symbol, _> = serde_json::from_str("\"b!\"");
        assert!(res.is_err());
    }
}
