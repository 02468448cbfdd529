//! Command dispatch.
//!
//! Every user action maps to a pure state transition on the owning
//! service followed by a notify step (view recompute / log revision),
//! keeping mutation decoupled from rendering.

use crate::app::App;
use crate::error::AppResult;
use rust_decimal::Decimal;
use serde_json::json;
use tickdesk_core::{Side, Symbol};
use tickdesk_telemetry::{Action, Event, Level};

/// User actions accepted by [`App::dispatch`].
///
/// Manual refresh is the one action that is not a synchronous command:
/// it runs through [`App::refresh_all`].
#[derive(Debug, Clone)]
pub enum Command {
    SetSymbol(String),
    SetAutoRefresh(bool),
    AddFavorite {
        symbol: String,
        quantity: Decimal,
        side: Side,
        reference_price: Decimal,
    },
    RemoveFavorite(usize),
    SetQuantity {
        index: usize,
        value: Decimal,
    },
    SetReference {
        index: usize,
        value: Decimal,
    },
    /// Enter the exclusive reorder state; in-flight requests are aborted.
    BeginReorder,
    /// Apply the permutation and leave the reorder state.
    CommitReorder {
        order: Vec<usize>,
    },
    /// Leave the reorder state without applying anything.
    CancelReorder,
    ClearFavorites,
    ClearLog,
    SetLogLevelFilter(Option<Level>),
    SetLogQuery(String),
    SetLogSourceFilter(Option<String>),
    SetLogSymbolFilter(Option<String>),
}

impl App {
    /// Apply one command.
    pub fn dispatch(&self, command: Command) -> AppResult<()> {
        match command {
            Command::SetSymbol(raw) => self.set_symbol(&raw),
            Command::SetAutoRefresh(enabled) => {
                if enabled {
                    self.scheduler().enable();
                } else {
                    self.scheduler().disable();
                }
                Ok(())
            }
            Command::AddFavorite {
                symbol,
                quantity,
                side,
                reference_price,
            } => {
                self.book
                    .lock()
                    .add(&symbol, quantity, side, reference_price)?;
                self.refresh_favorites_view();
                Ok(())
            }
            Command::RemoveFavorite(index) => {
                self.book.lock().remove(index)?;
                self.refresh_favorites_view();
                Ok(())
            }
            Command::SetQuantity { index, value } => {
                self.book.lock().set_quantity(index, value)?;
                self.refresh_favorites_view();
                Ok(())
            }
            Command::SetReference { index, value } => {
                self.book.lock().set_reference(index, value)?;
                self.refresh_favorites_view();
                Ok(())
            }
            Command::BeginReorder => {
                let guard = self.gate().begin();
                *self.reorder_guard.lock() = Some(guard);
                self.coordinator().cancel_inflight();
                Ok(())
            }
            Command::CommitReorder { order } => {
                // Leave the exclusive state unconditionally, even when the
                // permutation is rejected.
                drop(self.reorder_guard.lock().take());
                self.book.lock().apply_order(&order)?;
                self.refresh_favorites_view();
                self.scheduler().on_refresh_complete();
                Ok(())
            }
            Command::CancelReorder => {
                drop(self.reorder_guard.lock().take());
                self.refresh_favorites_view();
                Ok(())
            }
            Command::ClearFavorites => {
                self.book.lock().clear();
                self.refresh_favorites_view();
                Ok(())
            }
            Command::ClearLog => {
                self.log().clear();
                Ok(())
            }
            Command::SetLogLevelFilter(level) => {
                self.log().set_level_filter(level);
                Ok(())
            }
            Command::SetLogQuery(query) => {
                self.log().set_query(&query);
                Ok(())
            }
            Command::SetLogSourceFilter(source) => {
                self.log().set_source_filter(source);
                Ok(())
            }
            Command::SetLogSymbolFilter(symbol) => {
                self.log().set_symbol_filter(symbol);
                Ok(())
            }
        }
    }

    fn set_symbol(&self, raw: &str) -> AppResult<()> {
        let symbol = Symbol::parse(raw)?;
        *self.symbol.lock() = symbol.clone();
        self.settings().set_last_symbol(&symbol);
        self.log().event(
            Event::new("ui", Action::Update)
                .message(format!("Symbol changed: {symbol}"))
                .meta(json!({"symbol": symbol.as_str()})),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::AppError;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tickdesk_favorites::FavoritesError;

    fn app() -> (Arc<App>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            settings_path: dir
                .path()
                .join("settings.json")
                .to_string_lossy()
                .into_owned(),
            ..AppConfig::default()
        };
        (App::new(config).unwrap(), dir)
    }

    fn add(symbol: &str) -> Command {
        Command::AddFavorite {
            symbol: symbol.to_string(),
            quantity: dec!(1),
            side: Side::Buy,
            reference_price: dec!(0),
        }
    }

    #[test]
    fn test_set_symbol_persists_and_logs() {
        let (app, _dir) = app();
        app.dispatch(Command::SetSymbol("ethusdt".to_string())).unwrap();
        assert_eq!(app.active_symbol().as_str(), "ETHUSDT");
        assert_eq!(app.settings().load().last_symbol, "ETHUSDT");
        assert_eq!(
            app.status_line().as_deref(),
            Some("INFO: Symbol changed: ETHUSDT")
        );
    }

    #[test]
    fn test_set_symbol_rejects_invalid_input() {
        let (app, _dir) = app();
        let err = app.dispatch(Command::SetSymbol("b!".to_string())).unwrap_err();
        assert!(matches!(err, AppError::Core(_)));
        assert_eq!(app.active_symbol().as_str(), "BTCUSDT");
    }

    #[test]
    fn test_favorites_limit_and_duplicates_via_dispatch() {
        let (app, _dir) = app();
        for sym in ["AAAUSDT", "BBBUSDT", "CCCUSDT", "DDDUSDT"] {
            app.dispatch(add(sym)).unwrap();
        }
        let err = app.dispatch(add("EEEUSDT")).unwrap_err();
        assert!(matches!(
            err,
            AppError::Favorites(FavoritesError::LimitReached(4))
        ));
        let err = app.dispatch(add("AAAUSDT")).unwrap_err();
        assert!(matches!(err, AppError::Favorites(FavoritesError::Duplicate(_))));
        assert_eq!(app.book.lock().len(), 4);
    }

    #[test]
    fn test_favorites_mutations_update_view() {
        let (app, _dir) = app();
        app.dispatch(add("AAAUSDT")).unwrap();
        let report = app.view().favorites.unwrap();
        assert_eq!(report.rows.len(), 1);
        // No price has been fetched, so the row carries the sentinel state.
        assert_eq!(report.rows[0].price, None);

        app.dispatch(Command::RemoveFavorite(0)).unwrap();
        assert!(app.view().favorites.unwrap().rows.is_empty());
    }

    #[test]
    fn test_reorder_gesture_controls_gate() {
        let (app, _dir) = app();
        app.dispatch(add("AAAUSDT")).unwrap();
        app.dispatch(add("BBBUSDT")).unwrap();

        app.dispatch(Command::BeginReorder).unwrap();
        assert!(app.gate().is_suspended());

        app.dispatch(Command::CommitReorder { order: vec![1, 0] }).unwrap();
        assert!(!app.gate().is_suspended());
        let report = app.view().favorites.unwrap();
        assert_eq!(report.rows[0].symbol.as_str(), "BBBUSDT");
    }

    #[test]
    fn test_reorder_gate_clears_even_on_invalid_order() {
        let (app, _dir) = app();
        app.dispatch(add("AAAUSDT")).unwrap();
        app.dispatch(Command::BeginReorder).unwrap();
        let err = app
            .dispatch(Command::CommitReorder { order: vec![0, 0] })
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Favorites(FavoritesError::InvalidOrder)
        ));
        assert!(!app.gate().is_suspended());
    }

    #[test]
    fn test_cancel_reorder_releases_gate() {
        let (app, _dir) = app();
        app.dispatch(Command::BeginReorder).unwrap();
        assert!(app.gate().is_suspended());
        app.dispatch(Command::CancelReorder).unwrap();
        assert!(!app.gate().is_suspended());
    }

    #[test]
    fn test_auto_refresh_toggle_persists() {
        let (app, _dir) = app();
        app.dispatch(Command::SetAutoRefresh(true)).unwrap();
        assert!(app.scheduler().is_enabled());
        assert!(app.settings().load().auto_refresh);
        assert_eq!(app.countdown_label(), "Auto refresh: 5 s");

        app.dispatch(Command::SetAutoRefresh(false)).unwrap();
        assert!(!app.scheduler().is_enabled());
        assert!(!app.settings().load().auto_refresh);
    }

    #[test]
    fn test_clear_log_via_dispatch() {
        let (app, _dir) = app();
        assert!(!app.log().is_empty());
        app.dispatch(Command::ClearLog).unwrap();
        assert!(app.log().is_empty());
    }

    #[test]
    fn test_log_filter_commands() {
        let (app, _dir) = app();
        app.dispatch(Command::SetLogLevelFilter(Some(Level::Error))).unwrap();
        assert!(app.log().visible().is_empty());
        app.dispatch(Command::SetLogLevelFilter(None)).unwrap();
        assert!(!app.log().visible().is_empty());

        app.dispatch(Command::SetLogQuery("favorite".to_string())).unwrap();
        assert!(app.log().visible().is_empty());
        app.dispatch(add("AAAUSDT")).unwrap();
        assert_eq!(app.log().visible().len(), 1);
    }
}
