//! Typed market-data endpoints.
//!
//! The price table is always consumed in full, never per-symbol.

use crate::coordinator::RequestCoordinator;
use crate::error::{NetError, NetResult};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use tickdesk_core::Symbol;

/// Index of the closing price within a kline tuple.
const KLINE_CLOSE_INDEX: usize = 4;

/// One row of the full price table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SymbolPrice {
    pub symbol: String,
    pub price: Decimal,
}

/// 24-hour rolling ticker statistics.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker24h {
    pub price_change: Decimal,
    pub price_change_percent: Decimal,
    pub high_price: Decimal,
    pub low_price: Decimal,
    pub volume: Decimal,
    /// Close of the rolling window, epoch milliseconds.
    pub close_time: i64,
}

/// Market-data API client over the request coordinator.
#[derive(Clone)]
pub struct MarketDataApi {
    coordinator: RequestCoordinator,
    base_url: String,
}

impl MarketDataApi {
    pub fn new(coordinator: RequestCoordinator, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            coordinator,
            base_url,
        }
    }

    pub fn coordinator(&self) -> &RequestCoordinator {
        &self.coordinator
    }

    /// Fetch the full symbol→price table.
    pub async fn price_table(&self) -> NetResult<Vec<SymbolPrice>> {
        let url = format!("{}/api/v3/ticker/price", self.base_url);
        let body = self.coordinator.fetch_json(&url).await?;
        serde_json::from_value(body).map_err(|e| NetError::Decode {
            endpoint: "/api/v3/ticker/price".to_string(),
            message: e.to_string(),
        })
    }

    /// Fetch 24-hour statistics for one symbol.
    pub async fn ticker_24h(&self, symbol: &Symbol) -> NetResult<Ticker24h> {
        let url = format!("{}/api/v3/ticker/24hr?symbol={}", self.base_url, symbol);
        let body = self.coordinator.fetch_json(&url).await?;
        serde_json::from_value(body).map_err(|e| NetError::Decode {
            endpoint: "/api/v3/ticker/24hr".to_string(),
            message: e.to_string(),
        })
    }

    /// Fetch candlesticks and extract the closing price of each interval.
    pub async fn kline_closes(
        &self,
        symbol: &Symbol,
        interval: &str,
        limit: u32,
    ) -> NetResult<Vec<Decimal>> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url, symbol, interval, limit
        );
        let body = self.coordinator.fetch_json(&url).await?;
        let rows = body.as_array().ok_or_else(|| NetError::Decode {
            endpoint: "/api/v3/klines".to_string(),
            message: "expected an array of klines".to_string(),
        })?;
        Ok(rows.iter().filter_map(close_of_kline).collect())
    }
}

/// The closing price is the fifth element of the kline tuple, sent as a
/// decimal string. Malformed rows are skipped.
fn close_of_kline(row: &Value) -> Option<Decimal> {
    match row.get(KLINE_CLOSE_INDEX)? {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}
