//! Application wiring for tickdesk.
//!
//! Owns the refresh cycle (ensure prices → ticker → delay → klines →
//! favorites, strictly sequential), the command dispatch table, the
//! read-only view models, and configuration.

pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod view;

pub use app::App;
pub use commands::Command;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use view::{SparkSeries, TickerPanel, Trend, ViewState};
