//! Average True Range (ATR).

use crate::types::Candle;

/// True range of a bar against the previous close.
pub fn true_range(current: &Candle, previous: &Candle) -> f64 {
    let hl = current.high - current.low;
    let hc = (current.high - previous.close).abs();
    let lc = (current.low - previous.close).abs();
    hl.max(hc).max(lc)
}

/// Simple mean of the most recent `period` true ranges.
///
/// Intentionally unsmoothed (the risk engine consumes the plain mean).
/// Returns 0.0 when fewer than `period + 1` candles are available — callers
/// treat a zero ATR as a policy branch, not an error.
pub fn atr(candles: &[Candle], period: usize) -> f64 {
    if period == 0 || candles.len() < period + 1 {
        return 0.0;
    }

    let tr: Vec<f64> = candles
        .windows(2)
        .map(|w| true_range(&w[1], &w[0]))
        .collect();

    tr[tr.len() - period..].iter().sum::<f64>() / period as f64
}
