//! Application configuration.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration, loaded from TOML with per-field defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Exchange REST base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (ms).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Price cache validity window (ms).
    #[serde(default = "default_price_ttl_ms")]
    pub price_ttl_ms: u64,

    /// Deliberate delay between the ticker and kline fetches (ms).
    #[serde(default = "default_inter_fetch_delay_ms")]
    pub inter_fetch_delay_ms: u64,

    /// Kline interval for the sparkline series.
    #[serde(default = "default_kline_interval")]
    pub kline_interval: String,

    /// Number of klines fetched per cycle.
    #[serde(default = "default_kline_limit")]
    pub kline_limit: u32,

    /// Event log capacity before FIFO eviction.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,

    /// Settings document path.
    #[serde(default = "default_settings_path")]
    pub settings_path: String,
}

fn default_base_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_request_timeout_ms() -> u64 {
    8000
}

fn default_price_ttl_ms() -> u64 {
    3000
}

fn default_inter_fetch_delay_ms() -> u64 {
    120
}

fn default_kline_interval() -> String {
    "1m".to_string()
}

fn default_kline_limit() -> u32 {
    60
}

fn default_log_capacity() -> usize {
    tickdesk_telemetry::DEFAULT_CAPACITY
}

fn default_settings_path() -> String {
    "data/settings.json".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            price_ttl_ms: default_price_ttl_ms(),
            inter_fetch_delay_ms: default_inter_fetch_delay_ms(),
            kline_interval: default_kline_interval(),
            kline_limit: default_kline_limit(),
            log_capacity: default_log_capacity(),
            settings_path: default_settings_path(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &str) -> AppResult<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::warn!(path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("failed to read config: {e}")))?;
        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("failed to parse config: {e}")))
    }
}
