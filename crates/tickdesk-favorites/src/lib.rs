//! Tracked favorite positions and derived P&L.

pub mod book;
pub mod engine;
pub mod error;

pub use book::{FavoritesBook, MAX_FAVORITES};
pub use engine::{FavoritesEngine, FavoritesReport, FavoritesTotals, PositionReport};
pub use error::{FavoritesError, FavoritesResult};
