//! Whole-table price cache.
//!
//! The cache holds one symbol→price map with a single shared refresh
//! stamp. A refresh replaces the entire table; a failed refresh leaves
//! the previous table untouched (stale-but-available). Concurrent
//! refresh attempts coalesce onto one outstanding fetch.

use crate::error::{CacheError, CacheResult};
use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tickdesk_core::{ReorderGate, Symbol};
use tickdesk_net::{MarketDataApi, NetResult, SymbolPrice};
use tracing::{debug, warn};

/// Default cache validity window.
pub const DEFAULT_TTL: Duration = Duration::from_millis(3000);

/// Source of the full price table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn price_table(&self) -> NetResult<Vec<SymbolPrice>>;
}

#[async_trait]
impl PriceSource for MarketDataApi {
    async fn price_table(&self) -> NetResult<Vec<SymbolPrice>> {
        MarketDataApi::price_table(self).await
    }
}

type RefreshFuture = Shared<BoxFuture<'static, CacheResult<()>>>;

struct CacheShared {
    source: Arc<dyn PriceSource>,
    gate: ReorderGate,
    ttl: Duration,
    prices: RwLock<HashMap<String, Decimal>>,
    stamp: RwLock<Option<Instant>>,
    inflight: Mutex<Option<RefreshFuture>>,
}

/// Handle to the shared price cache.
#[derive(Clone)]
pub struct PriceCache {
    shared: Arc<CacheShared>,
}

impl PriceCache {
    pub fn new(source: Arc<dyn PriceSource>, gate: ReorderGate, ttl: Duration) -> Self {
        Self {
            shared: Arc::new(CacheShared {
                source,
                gate,
                ttl,
                prices: RwLock::new(HashMap::new()),
                stamp: RwLock::new(None),
                inflight: Mutex::new(None),
            }),
        }
    }

    /// Non-blocking read; `None` when the symbol is unknown.
    pub fn price(&self, symbol: &Symbol) -> Option<Decimal> {
        self.shared.prices.read().get(symbol.as_str()).copied()
    }

    /// The cache is valid when it was refreshed within the TTL and holds
    /// at least one entry.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Instant::now())
    }

    /// Clock-injected form of [`PriceCache::is_valid`].
    pub fn is_valid_at(&self, now: Instant) -> bool {
        let fresh = self
            .shared
            .stamp
            .read()
            .map(|stamp| now.duration_since(stamp) < self.shared.ttl)
            .unwrap_or(false);
        fresh && !self.shared.prices.read().is_empty()
    }

    /// Whether every requested symbol is present.
    pub fn covers(&self, symbols: &[Symbol]) -> bool {
        let prices = self.shared.prices.read();
        symbols.iter().all(|s| prices.contains_key(s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.shared.prices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.prices.read().is_empty()
    }

    /// Make sure the cache is valid for all of `symbols`.
    ///
    /// Never triggers a fetch when the cache is fresh and covers every
    /// requested symbol. A no-op while the reorder gate is held.
    pub async fn ensure_fresh(&self, symbols: &[Symbol]) -> CacheResult<()> {
        if self.shared.gate.is_suspended() {
            return Ok(());
        }
        if !self.is_valid() {
            self.preload_all(false).await?;
        }
        if !self.covers(symbols) {
            self.preload_all(true).await?;
        }
        Ok(())
    }

    /// Refresh the full price table.
    ///
    /// Without `force`, a valid cache short-circuits. While a refresh is
    /// outstanding every caller awaits the same shared future, so N
    /// concurrent callers cause exactly one outbound request.
    pub async fn preload_all(&self, force: bool) -> CacheResult<()> {
        if !force && self.is_valid() {
            return Ok(());
        }
        if self.shared.gate.is_suspended() {
            return Ok(());
        }

        let refresh = {
            let mut slot = self.shared.inflight.lock();
            match slot.as_ref() {
                Some(pending) => pending.clone(),
                None => {
                    let fut = Self::refresh_future(self.shared.clone());
                    *slot = Some(fut.clone());
                    fut
                }
            }
        };

        refresh.await
    }

    fn refresh_future(shared: Arc<CacheShared>) -> RefreshFuture {
        async move {
            let outcome = shared.source.price_table().await;
            // Clear the in-flight slot before reporting, so a failed
            // refresh can be retried by the next caller.
            *shared.inflight.lock() = None;

            match outcome {
                Ok(rows) => {
                    let mut table = HashMap::with_capacity(rows.len());
                    for row in rows {
                        table.insert(row.symbol, row.price);
                    }
                    let count = table.len();
                    *shared.prices.write() = table;
                    *shared.stamp.write() = Some(Instant::now());
                    debug!(count, "Price table refreshed");
                    Ok(())
                }
                Err(err) => {
                    if !err.is_suspended() {
                        warn!(error = %err, "Price table refresh failed, keeping stale data");
                    }
                    Err(CacheError::Refresh(Arc::new(err)))
                }
            }
        }
        .boxed()
        .shared()
    }
}
