//! External market-data sources.

pub mod binance;

pub use binance::BinanceClient;
