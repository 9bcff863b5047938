use std::env;
use std::path::PathBuf;

/// Minimum composite strength for a signal to be surfaced by the analyzer.
pub const MIN_SIGNAL_STRENGTH: f64 = 65.0;

/// Minimum composite strength for the scanner to auto-promote a signal to a
/// paper test. Deliberately stricter than `MIN_SIGNAL_STRENGTH`; the quick
/// crossover scan applies no threshold at all.
pub const AUTO_TEST_STRENGTH: f64 = 80.0;

/// Minimum risk:reward ratio enforced at signal creation.
pub const MIN_RISK_REWARD: f64 = 1.5;

/// Minimum candle history required for a full analysis pass.
pub const MIN_CANDLES: usize = 30;

/// Timeframes the scanner sweeps for every symbol.
pub const SCAN_TIMEFRAMES: &[&str] = &["1m", "5m", "15m", "30m", "1h", "4h", "1d"];

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Binance API key (optional, public endpoints work without).
    pub binance_api_key: Option<String>,
    /// Path of the flat-file test store.
    pub test_store_path: PathBuf,
    /// Seconds between full signal-scan sweeps.
    pub signal_refresh_secs: u64,
    /// Seconds between symbol-universe refreshes.
    pub symbols_refresh_secs: u64,
    /// Seconds between price ticks against active tests.
    pub test_poll_secs: u64,
    /// Analyses in flight at once during a sweep.
    pub analysis_concurrency: usize,
    /// Duplicate window for manually promoted tests, in minutes.
    pub manual_dedup_window_mins: i64,
    /// Duplicate window for auto-promoted tests, in minutes.
    pub auto_dedup_window_mins: i64,
    /// Minimum 24h quote volume for the symbol universe.
    pub min_quote_volume: f64,
    /// Symbol universe cap.
    pub max_symbols: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("VIGIL_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("VIGIL_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            binance_api_key: env::var("BINANCE_API_KEY").ok(),
            test_store_path: env::var("VIGIL_TEST_STORE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("tests.json")),
            signal_refresh_secs: env::var("VIGIL_SIGNAL_REFRESH_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            symbols_refresh_secs: env::var("VIGIL_SYMBOLS_REFRESH_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(900),
            test_poll_secs: env::var("VIGIL_TEST_POLL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            analysis_concurrency: env::var("VIGIL_ANALYSIS_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            manual_dedup_window_mins: 5,
            auto_dedup_window_mins: 240,
            min_quote_volume: env::var("VIGIL_MIN_QUOTE_VOLUME")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1_000_000.0),
            max_symbols: env::var("VIGIL_MAX_SYMBOLS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
