//! JSON settings document with best-effort semantics.

use crate::error::PersistenceResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tickdesk_core::{FavoritePosition, Symbol};
use tracing::{debug, warn};

/// Symbol used when nothing has been persisted yet.
pub const DEFAULT_SYMBOL: &str = "BTCUSDT";

/// The persisted settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_symbol")]
    pub last_symbol: String,
    #[serde(default)]
    pub auto_refresh: bool,
    #[serde(default)]
    pub favorites: Vec<FavoritePosition>,
}

fn default_symbol() -> String {
    DEFAULT_SYMBOL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_symbol: default_symbol(),
            auto_refresh: false,
            favorites: Vec::new(),
        }
    }
}

/// Handle to the settings document on disk.
///
/// Every save writes the whole document. Load failures (missing file,
/// IO error, malformed JSON) yield [`Settings::default`] and a WARN; save
/// failures are logged and swallowed. Neither ever raises to the caller.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: Arc<PathBuf>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    warn!(?e, path = %parent.display(), "Failed to create settings directory");
                }
            }
        }
        Self {
            path: Arc::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the settings document, falling back to defaults.
    pub fn load(&self) -> Settings {
        match self.read() {
            Ok(settings) => settings,
            Err(e) => {
                if self.path.exists() {
                    warn!(?e, path = %self.path.display(), "Failed to read settings, using defaults");
                } else {
                    debug!(path = %self.path.display(), "No settings file, using defaults");
                }
                Settings::default()
            }
        }
    }

    /// Persist the last-used symbol.
    pub fn set_last_symbol(&self, symbol: &Symbol) {
        let mut settings = self.load();
        settings.last_symbol = symbol.as_str().to_string();
        self.save(&settings);
    }

    /// Persist the auto-refresh flag.
    pub fn set_auto_refresh(&self, enabled: bool) {
        let mut settings = self.load();
        settings.auto_refresh = enabled;
        self.save(&settings);
    }

    /// Persist the full favorites list.
    pub fn set_favorites(&self, favorites: &[FavoritePosition]) {
        let mut settings = self.load();
        settings.favorites = favorites.to_vec();
        self.save(&settings);
    }

    fn save(&self, settings: &Settings) {
        if let Err(e) = self.write(settings) {
            warn!(?e, path = %self.path.display(), "Failed to write settings");
        }
    }

    fn read(&self) -> PersistenceResult<Settings> {
        let content = std::fs::read_to_string(self.path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, settings: &Settings) -> PersistenceResult<()> {
        let content = serde_json::to_string_pretty(settings)?;
        std::fs::write(self.path.as_ref(), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tickdesk_core::Side;

    fn store_in(dir: &tempfile::TempDir) -> SettingsStore {
        SettingsStore::new(dir.path().join("settings.json"))
    }

    #[test]
    fn test_load_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let settings = store.load();
        assert_eq!(settings.last_symbol, DEFAULT_SYMBOL);
        assert!(!settings.auto_refresh);
        assert!(settings.favorites.is_empty());
    }

    #[test]
    fn test_load_defaults_on_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let symbol = Symbol::parse("ETHUSDT").unwrap();
        store.set_last_symbol(&symbol);
        store.set_auto_refresh(true);
        let favorite = FavoritePosition::new(
            Symbol::parse("BTCUSDT").unwrap(),
            dec!(0.5),
            Side::Buy,
            dec!(60000),
        )
        .unwrap();
        store.set_favorites(std::slice::from_ref(&favorite));

        let settings = store.load();
        assert_eq!(settings.last_symbol, "ETHUSDT");
        assert!(settings.auto_refresh);
        assert_eq!(settings.favorites, vec![favorite]);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"auto_refresh": true}"#).unwrap();
        let settings = store.load();
        assert!(settings.auto_refresh);
        assert_eq!(settings.last_symbol, DEFAULT_SYMBOL);
        assert!(settings.favorites.is_empty());
    }
}
