//! Paper-test lifecycle: TP/SL touch evaluation, P&L and the price monitor.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::services::TestStore;
use crate::sources::BinanceClient;
use crate::types::{Direction, PaperTest, TestStatus};

/// Apply a price tick to a test.
///
/// Pure transform: the caller persists the result. Idempotent — a terminal
/// test is returned unchanged, and `tp`/`sl`/`status` are never touched
/// again after the single transition out of `Active`. Exits fill at the
/// threshold level itself, not the observed price.
pub fn evaluate_tick(test: &PaperTest, current_price: f64, now_secs: i64) -> PaperTest {
    if test.status.is_terminal() {
        return test.clone();
    }

    let mut updated = test.clone();
    updated.current_price = current_price;

    let (hit_tp, hit_sl) = match test.direction {
        Direction::Long => (current_price >= test.tp, current_price <= test.sl),
        Direction::Short => (current_price <= test.tp, current_price >= test.sl),
    };

    if hit_tp {
        updated.status = TestStatus::Completed;
        updated.final_price = Some(test.tp);
    } else if hit_sl {
        updated.status = TestStatus::Stopped;
        updated.final_price = Some(test.sl);
    }

    if updated.status.is_terminal() {
        updated.end_time = Some(now_secs);
        updated.final_pnl = Some(dollar_pnl(&updated));
    }

    updated
}

/// Price a P&L calculation should use: the frozen final price for terminal
/// tests, the latest observed price otherwise.
fn effective_price(test: &PaperTest) -> f64 {
    match test.final_price {
        Some(final_price) if test.status.is_terminal() => final_price,
        _ => test.current_price,
    }
}

/// Quote-currency P&L at the fixed position size.
pub fn dollar_pnl(test: &PaperTest) -> f64 {
    let price = effective_price(test);
    let quantity = test.quantity();
    match test.direction {
        Direction::Long => quantity * (price - test.entry_price),
        Direction::Short => quantity * (test.entry_price - price),
    }
}

/// P&L as a percentage of the entry price.
pub fn percent_pnl(test: &PaperTest) -> f64 {
    if test.entry_price == 0.0 {
        return 0.0;
    }
    let price = effective_price(test);
    match test.direction {
        Direction::Long => (price - test.entry_price) / test.entry_price * 100.0,
        Direction::Short => (test.entry_price - price) / test.entry_price * 100.0,
    }
}

/// Polls live prices against active tests on a fixed cadence.
///
/// A missed tick is harmless: thresholds are absolute prices, so the next
/// tick re-evaluates the same conditions.
pub struct TestMonitor {
    binance: Arc<BinanceClient>,
    store: Arc<TestStore>,
}

impl TestMonitor {
    pub fn new(binance: Arc<BinanceClient>, store: Arc<TestStore>) -> Arc<Self> {
        Arc::new(Self { binance, store })
    }

    /// Start the polling loop.
    pub fn start(self: &Arc<Self>, poll_secs: u64) {
        let monitor = self.clone();
        tokio::spawn(async move {
            info!("Starting test monitor ({poll_secs}s cadence)");
            loop {
                monitor.tick().await;
                tokio::time::sleep(Duration::from_secs(poll_secs)).await;
            }
        });
    }

    /// Run one evaluation pass over all active tests. Returns how many tests
    /// transitioned to a terminal status.
    pub async fn tick(&self) -> usize {
        let active: Vec<PaperTest> = self
            .store
            .all()
            .into_iter()
            .filter(|t| t.status == TestStatus::Active)
            .collect();
        if active.is_empty() {
            return 0;
        }

        // One price fetch per distinct symbol.
        let mut prices: HashMap<String, f64> = HashMap::new();
        for test in &active {
            if prices.contains_key(&test.symbol) {
                continue;
            }
            match self.binance.latest_price(&test.symbol).await {
                Ok(price) => {
                    prices.insert(test.symbol.clone(), price);
                }
                Err(e) => warn!("Price fetch failed for {}: {}", test.symbol, e),
            }
        }

        let now_secs = chrono::Utc::now().timestamp();
        let mut transitions = 0;

        for test in &active {
            let Some(&price) = prices.get(&test.symbol) else {
                continue;
            };
            let updated = evaluate_tick(test, price, now_secs);
            let transitioned = updated.status != test.status;
            if transitioned {
                transitions += 1;
                info!(
                    "Test {} ({} {}) -> {:?}, pnl {:.4} ({:.2}%)",
                    updated.id,
                    updated.symbol,
                    updated.direction.label(),
                    updated.status,
                    updated.final_pnl.unwrap_or_default(),
                    percent_pnl(&updated)
                );
            } else {
                debug!(
                    "Test {} still active at {} (tp {}, sl {})",
                    updated.id, price, updated.tp, updated.sl
                );
            }
            if let Err(e) = self.store.update(updated) {
                warn!("Failed to persist test update: {e}");
            }
        }

        transitions
    }
}
