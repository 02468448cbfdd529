//! TTL price cache with single-flight refresh coalescing.

pub mod error;
pub mod price_cache;

pub use error::{CacheError, CacheResult};
pub use price_cache::{PriceCache, PriceSource, DEFAULT_TTL};
