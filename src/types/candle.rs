use serde::{Deserialize, Serialize};

/// One OHLCV bar for a fixed interval.
///
/// `time` is the bar open time in epoch milliseconds (Binance kline
/// convention). Sequences are ordered by strictly increasing time and
/// immutable once fetched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Extract the close series from a candle sequence.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}
