//! Vigil - crypto market scanner with paper-trade simulation.
//!
//! Computes technical indicators over exchange candle data, scores entry
//! signals, and tracks promoted signals as paper tests against live prices.

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use std::sync::Arc;

use config::Config;
use services::{SignalScanner, TestStore};
use sources::BinanceClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub binance: Arc<BinanceClient>,
    pub store: Arc<TestStore>,
    pub scanner: Arc<SignalScanner>,
}
