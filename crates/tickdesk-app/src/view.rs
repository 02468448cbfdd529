//! Read-only view models.
//!
//! The UI layer renders these snapshots; it never mutates core state
//! directly. Unavailable numbers render as the fixed sentinel.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use tickdesk_core::fmt::{fmt_decimal, fmt_opt, fmt_signed};
use tickdesk_core::Symbol;
use tickdesk_favorites::FavoritesReport;
use tickdesk_net::Ticker24h;

/// Direction of a change, mapped to a style class by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn of(value: Decimal) -> Self {
        if value.is_sign_negative() && !value.is_zero() {
            Self::Down
        } else {
            Self::Up
        }
    }

    /// CSS class used by the excluded rendering layer.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Up => "text-good",
            Self::Down => "text-danger",
        }
    }
}

/// Formatted 24-hour ticker panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerPanel {
    pub symbol: Symbol,
    pub price: String,
    /// Signed change with percent, e.g. `+120.5 (0.19%)`.
    pub change: String,
    pub change_trend: Trend,
    pub high: String,
    pub low: String,
    pub volume: String,
    pub updated: String,
}

impl TickerPanel {
    pub fn build(symbol: Symbol, price: Option<Decimal>, stats: &Ticker24h) -> Self {
        let change = format!(
            "{} ({}%)",
            fmt_signed(stats.price_change, 0, 8),
            fmt_decimal(stats.price_change_percent, 2, 2)
        );
        let updated = Utc
            .timestamp_millis_opt(stats.close_time)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| tickdesk_core::fmt::UNAVAILABLE.to_string());
        Self {
            symbol,
            price: fmt_opt(price, 2, 8),
            change,
            change_trend: Trend::of(stats.price_change_percent),
            high: fmt_decimal(stats.high_price, 2, 8),
            low: fmt_decimal(stats.low_price, 2, 8),
            volume: fmt_decimal(stats.volume, 0, 2),
            updated,
        }
    }
}

/// Closing-price series for the sparkline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparkSeries {
    pub closes: Vec<Decimal>,
    /// Direction of the last step; drives the line color.
    pub trend: Trend,
}

impl SparkSeries {
    /// `None` when there are no closes to draw.
    pub fn build(closes: Vec<Decimal>) -> Option<Self> {
        let last = *closes.last()?;
        let prev = closes
            .len()
            .checked_sub(2)
            .map(|i| closes[i])
            .unwrap_or(last);
        let trend = if last >= prev { Trend::Up } else { Trend::Down };
        Some(Self { closes, trend })
    }
}

/// Everything the rendering layer reads after a refresh.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub ticker: Option<TickerPanel>,
    pub spark: Option<SparkSeries>,
    pub favorites: Option<FavoritesReport>,
}
