//! Volume surge measurement.

use crate::types::Candle;

/// Ratio of the latest volume to the trailing `period` mean, minus one.
///
/// 0.0 means "at average"; 1.0 means double the average. Returns 0.0 on an
/// empty window or a zero mean volume.
pub fn volume_increase(candles: &[Candle], period: usize) -> f64 {
    if period == 0 || candles.is_empty() {
        return 0.0;
    }

    let window = &candles[candles.len().saturating_sub(period)..];
    let mean = window.iter().map(|c| c.volume).sum::<f64>() / window.len() as f64;
    if mean == 0.0 {
        return 0.0;
    }

    let current = candles[candles.len() - 1].volume;
    current / mean - 1.0
}
