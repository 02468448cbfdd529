//! Error types for tickdesk-app.

use thiserror::Error;
use tickdesk_cache::CacheError;
use tickdesk_core::CoreError;
use tickdesk_favorites::FavoritesError;
use tickdesk_net::NetError;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Net(#[from] NetError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Favorites(#[from] FavoritesError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl AppError {
    /// Whether this failure is the silent reorder-suspended sentinel;
    /// such failures are never logged at ERROR level.
    pub fn is_suspended(&self) -> bool {
        match self {
            Self::Net(err) => err.is_suspended(),
            Self::Cache(err) => err.is_suspended(),
            _ => false,
        }
    }
}

/// Result type alias for application operations.
pub type AppResult<T> = std::result::Result<T, AppError>;
