//! Outbound request coordination for tickdesk.
//!
//! Every network call goes through the [`RequestCoordinator`]: it refuses
//! calls while a reorder gesture is active, bounds each call with a
//! cancellation token and timeout, registers in-flight calls for
//! cycle-level cancellation, and wraps each call in an event-log span
//! keyed by a URL-free endpoint label. The typed market-data endpoints
//! live in [`api`].

pub mod api;
pub mod coordinator;
pub mod error;

pub use api::{MarketDataApi, SymbolPrice, Ticker24h};
pub use coordinator::{RequestCoordinator, DEFAULT_TIMEOUT};
pub use error::{NetError, NetResult};
