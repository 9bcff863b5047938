//! Market scanner: the orchestrator behind the signals dashboard.
//!
//! Owns the symbol universe and a live signal cache, sweeps every
//! (symbol, timeframe) pair on a fixed cadence with bounded fan-out, and
//! auto-promotes sufficiently strong signals to paper tests. Each analysis
//! is independent and side-effect free; only promotion touches shared state,
//! through the test store's serialized create path.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use dashmap::DashMap;
use futures_util::{stream, StreamExt};
use tracing::{debug, info, warn};

use crate::analysis::analyze;
use crate::config::{Config, AUTO_TEST_STRENGTH, SCAN_TIMEFRAMES};
use crate::error::Result;
use crate::services::test_store::{NewTest, SaveOutcome, TestStore};
use crate::sources::BinanceClient;
use crate::types::SignalRecord;

/// Candles fetched per analysis.
const CANDLE_LIMIT: usize = 100;

/// Age after which a cached signal yields to a fresh one regardless of
/// strength.
const SIGNAL_STALE_MS: i64 = 60_000;

/// Scanning orchestrator.
pub struct SignalScanner {
    binance: Arc<BinanceClient>,
    store: Arc<TestStore>,
    config: Arc<Config>,
    symbols: RwLock<Vec<String>>,
    /// Live signals keyed by `symbol:timeframe:type`.
    signals: DashMap<String, SignalRecord>,
}

impl SignalScanner {
    pub fn new(binance: Arc<BinanceClient>, store: Arc<TestStore>, config: Arc<Config>) -> Arc<Self> {
        Arc::new(Self {
            binance,
            store,
            config,
            symbols: RwLock::new(Vec::new()),
            signals: DashMap::new(),
        })
    }

    /// Current symbol universe.
    pub fn symbols(&self) -> Vec<String> {
        self.symbols.read().unwrap().clone()
    }

    /// Replace the symbol universe (exposed for tests and manual overrides).
    pub fn set_symbols(&self, symbols: Vec<String>) {
        *self.symbols.write().unwrap() = symbols;
    }

    /// Refresh the top-pairs universe from the exchange.
    pub async fn refresh_symbols(&self) -> Result<usize> {
        let symbols = self
            .binance
            .top_symbols("USDT", self.config.min_quote_volume, self.config.max_symbols)
            .await?;
        let count = symbols.len();
        info!("Symbol universe refreshed: {count} pairs");
        self.set_symbols(symbols);
        Ok(count)
    }

    /// Sweep every (symbol, timeframe) pair once.
    ///
    /// Analyses run with bounded concurrency purely for latency; a failed
    /// pair is logged and skipped, the sweep continues.
    pub async fn refresh_signals(&self) {
        let symbols = self.symbols();
        if symbols.is_empty() {
            debug!("No symbols loaded yet - skipping sweep");
            return;
        }

        let mut pairs = Vec::with_capacity(symbols.len() * SCAN_TIMEFRAMES.len());
        for symbol in &symbols {
            for timeframe in SCAN_TIMEFRAMES {
                pairs.push((symbol.clone(), timeframe.to_string()));
            }
        }
        let total = pairs.len();

        let mut results = stream::iter(pairs.into_iter().map(|(symbol, timeframe): (String, String)| {
            let binance = self.binance.clone();
            async move {
                let result = binance
                    .fetch_candles(&symbol, &timeframe, CANDLE_LIMIT)
                    .await
                    .map(|candles| analyze(&candles, &symbol, &timeframe));
                (symbol, timeframe, result)
            }
        }))
        .buffer_unordered(self.config.analysis_concurrency.max(1));

        let mut emitted = 0usize;
        while let Some((symbol, timeframe, result)) = results.next().await {
            match result {
                Ok(signals) => {
                    for signal in signals {
                        emitted += 1;
                        self.ingest(signal);
                    }
                }
                Err(e) => warn!("Analysis failed for {symbol} {timeframe}: {e}"),
            }
        }

        info!("Sweep finished: {total} pairs analyzed, {emitted} signals");
    }

    /// Promote if strong enough, then merge into the live cache.
    fn ingest(&self, mut signal: SignalRecord) {
        if signal.strength >= AUTO_TEST_STRENGTH {
            match self.store.create(
                NewTest::from_signal(&signal, true),
                self.config.auto_dedup_window_mins,
                chrono::Utc::now().timestamp(),
            ) {
                Ok(SaveOutcome::Created(id)) => {
                    info!(
                        "Auto-testing {} {} signal ({:.1}%)",
                        signal.symbol,
                        signal.direction.label(),
                        signal.strength
                    );
                    signal.test_id = Some(id);
                }
                Ok(SaveOutcome::Duplicate) => {
                    debug!(
                        "Skipping duplicate test for {} {} ({:.1}%)",
                        signal.symbol,
                        signal.direction.label(),
                        signal.strength
                    );
                }
                Err(e) => warn!("Auto-test creation failed: {e}"),
            }
        }

        self.merge(signal);
    }

    /// Merge policy: a fresh signal replaces the cached one for its key only
    /// when stronger, or when the cached one has gone stale.
    fn merge(&self, signal: SignalRecord) {
        use dashmap::mapref::entry::Entry;

        let now_ms = chrono::Utc::now().timestamp_millis();
        match self.signals.entry(signal.key()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get();
                let keep_id = existing.test_id.clone();
                if signal.strength > existing.strength || now_ms - existing.time > SIGNAL_STALE_MS {
                    let mut signal = signal;
                    // A promoted key stays linked to its test.
                    if signal.test_id.is_none() {
                        signal.test_id = keep_id;
                    }
                    entry.insert(signal);
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(signal);
            }
        }
    }

    /// Current signals, strongest first.
    pub fn snapshot(&self) -> Vec<SignalRecord> {
        let mut signals: Vec<SignalRecord> =
            self.signals.iter().map(|e| e.value().clone()).collect();
        signals.sort_by(|a, b| b.strength.total_cmp(&a.strength));
        signals
    }

    /// Start the periodic sweep and universe-refresh loops.
    pub fn start(self: &Arc<Self>) {
        let scanner = self.clone();
        tokio::spawn(async move {
            if let Err(e) = scanner.refresh_symbols().await {
                warn!("Initial symbol load failed: {e}");
            }
            loop {
                scanner.refresh_signals().await;
                tokio::time::sleep(Duration::from_secs(scanner.config.signal_refresh_secs)).await;
            }
        });

        let scanner = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(scanner.config.symbols_refresh_secs)).await;
                if let Err(e) = scanner.refresh_symbols().await {
                    warn!("Symbol refresh failed: {e}");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, IndicatorSnapshot};
    use std::fs;
    use std::path::PathBuf;

    fn scanner_fixture(name: &str) -> (Arc<SignalScanner>, PathBuf) {
        let dir = std::env::temp_dir().join(format!(".vigil_scanner_{name}"));
        let _ = fs::remove_dir_all(&dir);
        let _ = fs::create_dir_all(&dir);
        let path = dir.join("tests.json");

        let binance = Arc::new(BinanceClient::new(None));
        let store = Arc::new(TestStore::open(path.clone()));
        let config = Arc::new(Config::from_env());
        (SignalScanner::new(binance, store, config), path)
    }

    fn cleanup(path: &PathBuf) {
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    fn signal(strength: f64, time: i64) -> SignalRecord {
        SignalRecord {
            direction: Direction::Long,
            symbol: "BTCUSDT".to_string(),
            timeframe: "1h".to_string(),
            price: 100.0,
            tp: 103.0,
            sl: 98.0,
            time,
            strength,
            strategy: "Advanced Scalping Strategy".to_string(),
            indicators: IndicatorSnapshot {
                ema_trend: "Bullish Setup".to_string(),
                rsi: "28.00".to_string(),
                macd: "0.00300000".to_string(),
                bb_position: "Favorable".to_string(),
                volume: "1.80x".to_string(),
                atr: "0.50000000".to_string(),
                risk_reward: "1.50".to_string(),
            },
            test_id: None,
        }
    }

    #[test]
    fn test_merge_keeps_stronger_signal() {
        let (scanner, path) = scanner_fixture("merge_stronger");
        let now = chrono::Utc::now().timestamp_millis();

        scanner.merge(signal(75.0, now));
        scanner.merge(signal(70.0, now));

        let snapshot = scanner.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].strength, 75.0);
        cleanup(&path);
    }

    #[test]
    fn test_merge_replaces_stale_signal() {
        let (scanner, path) = scanner_fixture("merge_stale");
        let now = chrono::Utc::now().timestamp_millis();

        scanner.merge(signal(75.0, now - 120_000));
        scanner.merge(signal(70.0, now));

        let snapshot = scanner.snapshot();
        assert_eq!(snapshot[0].strength, 70.0);
        cleanup(&path);
    }

    #[test]
    fn test_ingest_promotes_strong_signal_once() {
        let (scanner, path) = scanner_fixture("promote");
        let now = chrono::Utc::now().timestamp_millis();

        scanner.ingest(signal(85.0, now));
        let snapshot = scanner.snapshot();
        assert_eq!(snapshot.len(), 1);
        let test_id = snapshot[0].test_id.clone().expect("should be promoted");

        // A second strong sweep result for the same pair is a duplicate
        // while the first test is active, and the link survives the merge.
        scanner.ingest(signal(90.0, now));
        let snapshot = scanner.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].test_id, Some(test_id));
        assert_eq!(scanner.store.all().len(), 1);
        cleanup(&path);
    }

    #[test]
    fn test_weak_signal_not_promoted() {
        let (scanner, path) = scanner_fixture("no_promote");
        let now = chrono::Utc::now().timestamp_millis();

        scanner.ingest(signal(70.0, now));
        assert!(scanner.snapshot()[0].test_id.is_none());
        assert!(scanner.store.all().is_empty());
        cleanup(&path);
    }

    #[test]
    fn test_snapshot_sorted_by_strength() {
        let (scanner, path) = scanner_fixture("sorted");
        let now = chrono::Utc::now().timestamp_millis();

        let mut weaker = signal(68.0, now);
        weaker.timeframe = "5m".to_string();
        scanner.merge(signal(75.0, now));
        scanner.merge(weaker);

        let snapshot = scanner.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot[0].strength >= snapshot[1].strength);
        cleanup(&path);
    }
}
