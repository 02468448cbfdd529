//! The user-owned favorites list.
//!
//! Capacity-bounded, unique per symbol, persisted as the full list on
//! every mutation. Validation failures are synchronous and never logged
//! at ERROR level; successful mutations log INFO.

use crate::error::{FavoritesError, FavoritesResult};
use rust_decimal::Decimal;
use serde_json::json;
use tickdesk_core::{CoreError, FavoritePosition, Side, Symbol};
use tickdesk_persistence::SettingsStore;
use tickdesk_telemetry::EventLog;

/// Maximum tracked positions.
pub const MAX_FAVORITES: usize = 4;

/// The ordered list of tracked positions.
pub struct FavoritesBook {
    positions: Vec<FavoritePosition>,
    store: SettingsStore,
    log: EventLog,
}

impl FavoritesBook {
    /// Restore the book from persisted settings.
    pub fn restore(store: SettingsStore, log: EventLog) -> Self {
        let mut positions = store.load().favorites;
        positions.truncate(MAX_FAVORITES);
        Self {
            positions,
            store,
            log,
        }
    }

    pub fn positions(&self) -> &[FavoritePosition] {
        &self.positions
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.positions.iter().map(|p| p.symbol.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.positions.len() >= MAX_FAVORITES
    }

    /// Add a new tracked position.
    pub fn add(
        &mut self,
        symbol: &str,
        quantity: Decimal,
        side: Side,
        reference_price: Decimal,
    ) -> FavoritesResult<()> {
        let symbol = Symbol::parse(symbol)?;
        if self.is_full() {
            return Err(FavoritesError::LimitReached(MAX_FAVORITES));
        }
        if self.positions.iter().any(|p| p.symbol == symbol) {
            return Err(FavoritesError::Duplicate(symbol.as_str().to_string()));
        }
        let position = FavoritePosition::new(symbol, quantity, side, reference_price)?;
        self.log.info(
            &format!("Favorite added: {}", position.symbol),
            json!({"symbol": position.symbol.as_str()}),
        );
        self.positions.push(position);
        self.persist();
        Ok(())
    }

    /// Remove the position at `index`; later entries shift down by one.
    pub fn remove(&mut self, index: usize) -> FavoritesResult<FavoritePosition> {
        if index >= self.positions.len() {
            return Err(FavoritesError::IndexOutOfRange(index));
        }
        let removed = self.positions.remove(index);
        self.log.info(
            &format!("Favorite removed: {}", removed.symbol),
            json!({"symbol": removed.symbol.as_str()}),
        );
        self.persist();
        Ok(removed)
    }

    /// Edit the quantity in place.
    pub fn set_quantity(&mut self, index: usize, quantity: Decimal) -> FavoritesResult<()> {
        if quantity.is_sign_negative() {
            return Err(CoreError::InvalidQuantity(quantity.to_string()).into());
        }
        let position = self
            .positions
            .get_mut(index)
            .ok_or(FavoritesError::IndexOutOfRange(index))?;
        position.quantity = quantity;
        self.persist();
        Ok(())
    }

    /// Edit the reference price in place.
    pub fn set_reference(&mut self, index: usize, reference_price: Decimal) -> FavoritesResult<()> {
        if reference_price.is_sign_negative() {
            return Err(CoreError::InvalidPrice(reference_price.to_string()).into());
        }
        let position = self
            .positions
            .get_mut(index)
            .ok_or(FavoritesError::IndexOutOfRange(index))?;
        position.reference_price = reference_price;
        self.persist();
        Ok(())
    }

    /// Commit a reorder: `order[i]` is the old index now shown at row `i`.
    pub fn apply_order(&mut self, order: &[usize]) -> FavoritesResult<()> {
        if order.len() != self.positions.len() {
            return Err(FavoritesError::InvalidOrder);
        }
        let mut seen = vec![false; order.len()];
        for &index in order {
            if index >= seen.len() || seen[index] {
                return Err(FavoritesError::InvalidOrder);
            }
            seen[index] = true;
        }
        let reordered: Vec<FavoritePosition> =
            order.iter().map(|&i| self.positions[i].clone()).collect();
        self.positions = reordered;
        self.log.info("Favorite order changed", json!({}));
        self.persist();
        Ok(())
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.log.info("All favorites removed", json!({}));
        self.persist();
    }

    fn persist(&self) {
        self.store.set_favorites(&self.positions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tickdesk_telemetry::Level;

    fn book() -> (FavoritesBook, SettingsStore, EventLog, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        let log = EventLog::new(100);
        (
            FavoritesBook::restore(store.clone(), log.clone()),
            store,
            log,
            dir,
        )
    }

    #[test]
    fn test_add_and_persist() {
        let (mut book, store, _log, _dir) = book();
        book.add("btcusdt", dec!(0.5), Side::Buy, dec!(60000)).unwrap();
        assert_eq!(book.len(), 1);
        assert_eq!(book.positions()[0].symbol.as_str(), "BTCUSDT");
        assert_eq!(store.load().favorites.len(), 1);
    }

    #[test]
    fn test_add_rejects_invalid_input() {
        let (mut book, _store, log, _dir) = book();
        assert!(matches!(
            book.add("b!", dec!(1), Side::Buy, dec!(0)),
            Err(FavoritesError::Invalid(_))
        ));
        assert!(matches!(
            book.add("BTCUSDT", dec!(-1), Side::Buy, dec!(0)),
            Err(FavoritesError::Invalid(_))
        ));
        assert!(book.is_empty());
        // Validation failures are never logged at ERROR level.
        assert!(log.visible().iter().all(|r| r.level != Level::Error));
    }

    #[test]
    fn test_capacity_limit() {
        let (mut book, _store, _log, _dir) = book();
        for sym in ["AAAUSDT", "BBBUSDT", "CCCUSDT", "DDDUSDT"] {
            book.add(sym, dec!(1), Side::Buy, dec!(0)).unwrap();
        }
        let err = book.add("EEEUSDT", dec!(1), Side::Buy, dec!(0)).unwrap_err();
        assert!(matches!(err, FavoritesError::LimitReached(4)));
        assert_eq!(book.len(), 4);
    }

    #[test]
    fn test_duplicate_symbol_leaves_list_unchanged() {
        let (mut book, _store, _log, _dir) = book();
        book.add("BTCUSDT", dec!(1), Side::Buy, dec!(0)).unwrap();
        let err = book
            .add(" btcusdt ", dec!(2), Side::Sell, dec!(100))
            .unwrap_err();
        assert!(matches!(err, FavoritesError::Duplicate(_)));
        assert_eq!(book.len(), 1);
        assert_eq!(book.positions()[0].quantity, dec!(1));
    }

    #[test]
    fn test_remove_shifts_and_persists() {
        let (mut book, store, _log, _dir) = book();
        for sym in ["AAAUSDT", "BBBUSDT", "CCCUSDT"] {
            book.add(sym, dec!(1), Side::Buy, dec!(0)).unwrap();
        }
        let removed = book.remove(1).unwrap();
        assert_eq!(removed.symbol.as_str(), "BBBUSDT");
        assert_eq!(book.positions()[0].symbol.as_str(), "AAAUSDT");
        assert_eq!(book.positions()[1].symbol.as_str(), "CCCUSDT");
        assert_eq!(store.load().favorites.len(), 2);

        assert!(matches!(
            book.remove(5),
            Err(FavoritesError::IndexOutOfRange(5))
        ));
    }

    #[test]
    fn test_edit_in_place() {
        let (mut book, store, _log, _dir) = book();
        book.add("BTCUSDT", dec!(1), Side::Buy, dec!(0)).unwrap();
        book.set_quantity(0, dec!(2.5)).unwrap();
        book.set_reference(0, dec!(61000)).unwrap();
        assert!(book.set_quantity(0, dec!(-1)).is_err());
        assert!(book.set_reference(3, dec!(1)).is_err());

        let saved = store.load().favorites;
        assert_eq!(saved[0].quantity, dec!(2.5));
        assert_eq!(saved[0].reference_price, dec!(61000));
    }

    #[test]
    fn test_apply_order() {
        let (mut book, _store, _log, _dir) = book();
        for sym in ["AAAUSDT", "BBBUSDT", "CCCUSDT"] {
            book.add(sym, dec!(1), Side::Buy, dec!(0)).unwrap();
        }
        book.apply_order(&[2, 0, 1]).unwrap();
        let symbols: Vec<&str> = book.positions().iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["CCCUSDT", "AAAUSDT", "BBBUSDT"]);

        assert!(matches!(
            book.apply_order(&[0, 0, 1]),
            Err(FavoritesError::InvalidOrder)
        ));
        assert!(matches!(
            book.apply_order(&[0, 1]),
            Err(FavoritesError::InvalidOrder)
        ));
    }

    #[test]
    fn test_restore_truncates_to_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        let positions: Vec<FavoritePosition> = ["AAAUSDT", "BBBUSDT", "CCCUSDT", "DDDUSDT", "EEEUSDT"]
            .iter()
            .map(|s| {
                FavoritePosition::new(Symbol::parse(s).unwrap(), dec!(1), Side::Buy, dec!(0))
                    .unwrap()
            })
            .collect();
        store.set_favorites(&positions);

        let book = FavoritesBook::restore(store, EventLog::new(10));
        assert_eq!(book.len(), MAX_FAVORITES);
    }

    #[test]
    fn test_clear() {
        let (mut book, store, _log, _dir) = book();
        book.add("BTCUSDT", dec!(1), Side::Buy, dec!(0)).unwrap();
        book.clear();
        assert!(book.is_empty());
        assert!(store.load().favorites.is_empty());
    }
}
