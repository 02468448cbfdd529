//! Error types for tickdesk-persistence.

use thiserror::Error;

/// Persistence error types.
///
/// These never escape the store's public API; failures degrade to
/// defaults (loads) or are logged and swallowed (saves).
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type alias for persistence operations.
pub type PersistenceResult<T> = std::result::Result<T, PersistenceError>;
