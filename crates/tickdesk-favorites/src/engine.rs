//! Derived position values and hysteresis-gated P&L reporting.

use rust_decimal::Decimal;
use serde_json::json;
use tickdesk_cache::PriceCache;
use tickdesk_core::fmt::fmt_signed_usd;
use tickdesk_core::{FavoritePosition, ReorderGate, Side, Symbol};
use tickdesk_telemetry::{Action, Event, EventLog};

/// Minimum absolute aggregate P&L change that forces a report.
const REPORT_JUMP: Decimal = Decimal::ONE_HUNDRED;

/// Computed fields for one position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionReport {
    pub symbol: Symbol,
    pub side: Side,
    pub quantity: Decimal,
    pub reference_price: Decimal,
    /// Live price; `None` when the cache does not know the symbol.
    pub price: Option<Decimal>,
    /// `price - reference`; `None` without a reference or price.
    pub deviation: Option<Decimal>,
    /// Signed profit/loss; `None` without a reference, quantity, or price.
    pub pnl: Option<Decimal>,
    /// `price * quantity`; zero when the price is unknown.
    pub market_value: Decimal,
    /// `reference * quantity`.
    pub reference_value: Decimal,
}

/// Aggregate totals across all positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FavoritesTotals {
    pub market_value: Decimal,
    pub reference_value: Decimal,
    /// Sum of the defined per-position P&L values.
    pub pnl: Decimal,
    /// Whether any position has a reference price set.
    pub has_reference: bool,
}

/// Snapshot handed to the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoritesReport {
    pub rows: Vec<PositionReport>,
    pub totals: FavoritesTotals,
}

/// Recomputes position values and reports aggregate P&L with hysteresis.
///
/// The last reported aggregate is engine-owned state: it updates only
/// when a report is actually emitted, so small oscillations around the
/// last value stay silent.
pub struct FavoritesEngine {
    log: EventLog,
    gate: ReorderGate,
    jump_threshold: Decimal,
    last_reported_pnl: Decimal,
}

impl FavoritesEngine {
    pub fn new(log: EventLog, gate: ReorderGate) -> Self {
        Self {
            log,
            gate,
            jump_threshold: REPORT_JUMP,
            last_reported_pnl: Decimal::ZERO,
        }
    }

    #[cfg(test)]
    fn with_threshold(log: EventLog, gate: ReorderGate, jump_threshold: Decimal) -> Self {
        Self {
            log,
            gate,
            jump_threshold,
            last_reported_pnl: Decimal::ZERO,
        }
    }

    /// Recompute every position against the live price cache.
    pub fn recompute(
        &mut self,
        positions: &[FavoritePosition],
        cache: &PriceCache,
    ) -> FavoritesReport {
        self.recompute_with(positions, |symbol| cache.price(symbol))
    }

    /// Recompute with an arbitrary price lookup.
    pub fn recompute_with<F>(&mut self, positions: &[FavoritePosition], price_of: F) -> FavoritesReport
    where
        F: Fn(&Symbol) -> Option<Decimal>,
    {
        let rows: Vec<PositionReport> = positions
            .iter()
            .map(|p| Self::evaluate(p, price_of(&p.symbol)))
            .collect();

        let mut totals = FavoritesTotals::default();
        for row in &rows {
            totals.market_value += row.market_value;
            totals.reference_value += row.reference_value;
            if let Some(pnl) = row.pnl {
                totals.pnl += pnl;
            }
        }
        totals.has_reference = positions.iter().any(FavoritePosition::has_reference);

        self.maybe_report(&totals);
        FavoritesReport { rows, totals }
    }

    /// Derive the computed fields for one position.
    pub fn evaluate(position: &FavoritePosition, price: Option<Decimal>) -> PositionReport {
        let reference = position.reference_price;
        let quantity = position.quantity;
        let has_reference = position.has_reference();

        let deviation = match price {
            Some(p) if has_reference => Some(p - reference),
            _ => None,
        };
        let pnl = match price {
            Some(p) if has_reference && !quantity.is_zero() => Some(match position.side {
                Side::Buy => (p - reference) * quantity,
                Side::Sell => (reference - p) * quantity,
            }),
            _ => None,
        };

        PositionReport {
            symbol: position.symbol.clone(),
            side: position.side,
            quantity,
            reference_price: reference,
            price,
            deviation,
            pnl,
            market_value: price.map(|p| p * quantity).unwrap_or_default(),
            reference_value: reference * quantity,
        }
    }

    /// The last aggregate P&L that was actually reported.
    pub fn last_reported_pnl(&self) -> Decimal {
        self.last_reported_pnl
    }

    /// Emit the aggregate P&L event only on a sign change or a jump of
    /// at least the threshold; skipped entirely during a reorder gesture.
    fn maybe_report(&mut self, totals: &FavoritesTotals) {
        if !totals.has_reference || self.gate.is_suspended() {
            return;
        }
        let sign_changed = signum(totals.pnl) != signum(self.last_reported_pnl);
        let jumped = (totals.pnl - self.last_reported_pnl).abs() >= self.jump_threshold;
        if !(sign_changed || jumped) {
            return;
        }
        self.log.event(
            Event::new("calc", Action::Update)
                .message(format!("Total P&L: {}", fmt_signed_usd(totals.pnl)))
                .meta(json!({
                    "pnl": totals.pnl,
                    "prev": self.last_reported_pnl,
                    "market": totals.market_value,
                    "ref": totals.reference_value,
                })),
        );
        self.last_reported_pnl = totals.pnl;
    }
}

fn signum(value: Decimal) -> i8 {
    if value.is_zero() {
        0
    } else if value.is_sign_negative() {
        -1
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn position(symbol: &str, qty: Decimal, side: Side, reference: Decimal) -> FavoritePosition {
        FavoritePosition::new(Symbol::parse(symbol).unwrap(), qty, side, reference).unwrap()
    }

    fn engine() -> (FavoritesEngine, EventLog) {
        let log = EventLog::new(100);
        (FavoritesEngine::new(log.clone(), ReorderGate::new()), log)
    }

    fn calc_events(log: &EventLog) -> usize {
        log.visible()
            .iter()
            .filter(|r| r.metadata["type"] == serde_json::json!("calc"))
            .count()
    }

    #[test]
    fn test_evaluate_buy_side() {
        let pos = position("BTCUSDT", dec!(2), Side::Buy, dec!(60000));
        let report = FavoritesEngine::evaluate(&pos, Some(dec!(65000)));
        assert_eq!(report.deviation, Some(dec!(5000)));
        assert_eq!(report.pnl, Some(dec!(10000)));
        assert_eq!(report.market_value, dec!(130000));
        assert_eq!(report.reference_value, dec!(120000));
    }

    #[test]
    fn test_evaluate_sell_side() {
        let pos = position("BTCUSDT", dec!(2), Side::Sell, dec!(60000));
        let report = FavoritesEngine::evaluate(&pos, Some(dec!(65000)));
        assert_eq!(report.deviation, Some(dec!(5000)));
        assert_eq!(report.pnl, Some(dec!(-10000)));
    }

    #[test]
    fn test_evaluate_undefined_without_reference_or_quantity() {
        let no_ref = position("BTCUSDT", dec!(2), Side::Buy, dec!(0));
        let report = FavoritesEngine::evaluate(&no_ref, Some(dec!(65000)));
        assert_eq!(report.deviation, None);
        assert_eq!(report.pnl, None);
        assert_eq!(report.market_value, dec!(130000));

        let no_qty = position("BTCUSDT", dec!(0), Side::Buy, dec!(60000));
        let report = FavoritesEngine::evaluate(&no_qty, Some(dec!(65000)));
        assert_eq!(report.deviation, Some(dec!(5000)));
        assert_eq!(report.pnl, None);
    }

    #[test]
    fn test_evaluate_unknown_price() {
        let pos = position("BTCUSDT", dec!(2), Side::Buy, dec!(60000));
        let report = FavoritesEngine::evaluate(&pos, None);
        assert_eq!(report.price, None);
        assert_eq!(report.deviation, None);
        assert_eq!(report.pnl, None);
        assert_eq!(report.market_value, Decimal::ZERO);
        assert_eq!(report.reference_value, dec!(120000));
    }

    #[test]
    fn test_totals_sum_defined_pnl_only() {
        let (mut engine, _log) = engine();
        let positions = vec![
            position("AAAUSDT", dec!(1), Side::Buy, dec!(100)),
            position("BBBUSDT", dec!(1), Side::Buy, dec!(0)), // no reference -> no pnl
        ];
        let report = engine.recompute_with(&positions, |s| match s.as_str() {
            "AAAUSDT" => Some(dec!(150)),
            "BBBUSDT" => Some(dec!(30)),
            _ => None,
        });
        assert_eq!(report.totals.pnl, dec!(50));
        assert_eq!(report.totals.market_value, dec!(180));
        assert_eq!(report.totals.reference_value, dec!(100));
        assert!(report.totals.has_reference);
    }

    #[test]
    fn test_hysteresis_thresholds() {
        let (mut engine, log) = engine();
        let positions = vec![position("AAAUSDT", dec!(1), Side::Buy, dec!(100))];

        // First recompute: +50 flips the sign away from the initial 0.
        engine.recompute_with(&positions, |_| Some(dec!(150)));
        assert_eq!(calc_events(&log), 1);
        assert_eq!(engine.last_reported_pnl(), dec!(50));

        // +55: same sign, |delta| = 5 < 100 -> silent.
        engine.recompute_with(&positions, |_| Some(dec!(155)));
        assert_eq!(calc_events(&log), 1);
        assert_eq!(engine.last_reported_pnl(), dec!(50));

        // -10: sign flip -> reports.
        engine.recompute_with(&positions, |_| Some(dec!(90)));
        assert_eq!(calc_events(&log), 2);
        assert_eq!(engine.last_reported_pnl(), dec!(-10));

        // +160: jump of 170 >= 100 -> reports.
        engine.recompute_with(&positions, |_| Some(dec!(260)));
        assert_eq!(calc_events(&log), 3);
        assert_eq!(engine.last_reported_pnl(), dec!(160));
    }

    #[test]
    fn test_report_message_and_metadata() {
        let (mut engine, log) = engine();
        let positions = vec![position("AAAUSDT", dec!(1), Side::Buy, dec!(100))];
        engine.recompute_with(&positions, |_| Some(dec!(260)));

        let records = log.visible();
        let record = records
            .iter()
            .find(|r| r.metadata["type"] == serde_json::json!("calc"))
            .unwrap();
        assert_eq!(record.message, "Total P&L: +$160.00");
        assert_eq!(record.metadata["action"], serde_json::json!("update"));
        assert_eq!(record.metadata["prev"], serde_json::json!("0"));
        // A calc.update event also refreshes the status line.
        assert_eq!(
            log.status_line().as_deref(),
            Some("INFO: Total P&L: +$160.00")
        );
    }

    #[test]
    fn test_no_report_without_references() {
        let (mut engine, log) = engine();
        let positions = vec![position("AAAUSDT", dec!(1), Side::Buy, dec!(0))];
        engine.recompute_with(&positions, |_| Some(dec!(500)));
        assert_eq!(calc_events(&log), 0);
    }

    #[test]
    fn test_no_report_while_suspended() {
        let gate = ReorderGate::new();
        let log = EventLog::new(100);
        let mut engine = FavoritesEngine::with_threshold(log.clone(), gate.clone(), dec!(100));
        let positions = vec![position("AAAUSDT", dec!(1), Side::Buy, dec!(100))];

        let guard = gate.begin();
        engine.recompute_with(&positions, |_| Some(dec!(500)));
        assert_eq!(calc_events(&log), 0);
        assert_eq!(engine.last_reported_pnl(), Decimal::ZERO);

        // After the gesture the pending change reports normally.
        drop(guard);
        engine.recompute_with(&positions, |_| Some(dec!(500)));
        assert_eq!(calc_events(&log), 1);
        assert_eq!(engine.last_reported_pnl(), dec!(400));
    }

    #[test]
    fn test_signum() {
        assert_eq!(signum(dec!(5)), 1);
        assert_eq!(signum(dec!(-5)), -1);
        assert_eq!(signum(Decimal::ZERO), 0);
    }
}
