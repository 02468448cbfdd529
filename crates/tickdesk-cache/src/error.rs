//! Error types for tickdesk-cache.

use std::sync::Arc;
use thiserror::Error;
use tickdesk_net::NetError;

/// Cache error types.
///
/// The refresh error is shared (`Arc`) because single-flight coalescing
/// hands the same outcome to every concurrent caller.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("price refresh failed: {0}")]
    Refresh(#[source] Arc<NetError>),
}

impl CacheError {
    /// Whether the underlying failure is the silent reorder-suspended
    /// sentinel.
    pub fn is_suspended(&self) -> bool {
        match self {
            Self::Refresh(inner) => inner.is_suspended(),
        }
    }
}

/// Result type alias for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;
