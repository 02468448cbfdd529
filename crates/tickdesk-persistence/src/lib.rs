//! Best-effort settings persistence for tickdesk.
//!
//! Persists the three cross-session values: last-used symbol, the
//! auto-refresh flag, and the favorites list. Reads never fail — a
//! missing or unreadable document yields defaults.

pub mod error;
pub mod store;

pub use error::{PersistenceError, PersistenceResult};
pub use store::{Settings, SettingsStore, DEFAULT_SYMBOL};
