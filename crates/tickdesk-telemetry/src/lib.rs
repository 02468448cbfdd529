//! Structured event log and observability for tickdesk.
//!
//! Provides:
//! - The application-facing [`EventLog`]: append-only, capacity-bounded
//!   records with filtering, timed spans, deduplication, and the compact
//!   status line
//! - Structured logging initialization with tracing
//! - Prometheus metrics

pub mod error;
pub mod event_log;
pub mod logging;
pub mod metrics;
pub mod span;
mod status;

pub use error::{TelemetryError, TelemetryResult};
pub use event_log::{Action, Event, EventLog, Level, LogRecord, DEFAULT_CAPACITY};
pub use logging::init_logging;
pub use span::Span;
