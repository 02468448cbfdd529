//! Error types for tickdesk-net.

use thiserror::Error;

/// Network error types.
///
/// `Suspended` is a distinguished silent failure: it is never logged at
/// ERROR level and must not interrupt the reorder gesture that caused it.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("request refused: reorder in progress")]
    Suspended,

    #[error("request timed out: {endpoint}")]
    Timeout { endpoint: String },

    #[error("request cancelled: {endpoint}")]
    Cancelled { endpoint: String },

    #[error("HTTP {status} — {endpoint}")]
    Status { status: u16, endpoint: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error at {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl NetError {
    /// Whether this is the silent reorder-suspended sentinel.
    pub fn is_suspended(&self) -> bool {
        matches!(self, Self::Suspended)
    }

    /// Short outcome label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Suspended => "suspended",
            Self::Timeout { .. } => "timeout",
            Self::Cancelled { .. } => "cancelled",
            Self::Status { .. } => "status",
            Self::Transport(_) => "transport",
            Self::Decode { .. } => "decode",
        }
    }
}

/// Result type alias for network operations.
pub type NetResult<T> = std::result::Result<T, NetError>;
