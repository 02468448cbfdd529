//! Error types for tickdesk-core.

use thiserror::Error;

/// Core error types.
///
/// These are validation failures: they are reported synchronously to the
/// caller and are never logged at ERROR level.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
