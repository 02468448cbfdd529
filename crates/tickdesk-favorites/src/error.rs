//! Error types for tickdesk-favorites.

use thiserror::Error;
use tickdesk_core::CoreError;

/// Favorites validation errors.
///
/// Reported synchronously to the caller; never logged at ERROR level.
#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error("favorites limit reached ({0})")]
    LimitReached(usize),

    #[error("already tracked: {0}")]
    Duplicate(String),

    #[error("no favorite at index {0}")]
    IndexOutOfRange(usize),

    #[error("reorder is not a permutation of the current list")]
    InvalidOrder,
}

/// Result type alias for favorites operations.
pub type FavoritesResult<T> = std::result::Result<T, FavoritesError>;
