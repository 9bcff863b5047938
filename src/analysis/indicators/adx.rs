//! Average Directional Index (ADX).

use crate::types::Candle;

use super::true_range;

/// ADX with Wilder smoothing.
///
/// Per-bar +DM/-DM and TR are accumulated into Wilder running sums seeded
/// over the first `period` bars; DX is smoothed into ADX from there. Aligned
/// to the input; the first `period + 1` entries are `None`.
pub fn adx(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; candles.len()];
    if period == 0 || candles.len() < period + 2 {
        return out;
    }

    let mut tr = Vec::with_capacity(candles.len() - 1);
    let mut plus_dm = Vec::with_capacity(candles.len() - 1);
    let mut minus_dm = Vec::with_capacity(candles.len() - 1);

    for w in candles.windows(2) {
        let (previous, current) = (&w[0], &w[1]);
        let up_move = current.high - previous.high;
        let down_move = previous.low - current.low;

        plus_dm.push(if up_move > down_move { up_move.max(0.0) } else { 0.0 });
        minus_dm.push(if down_move > up_move { down_move.max(0.0) } else { 0.0 });
        tr.push(true_range(current, previous));
    }

    let mut tr_sum: f64 = tr.iter().take(period).sum();
    let mut plus_sum: f64 = plus_dm.iter().take(period).sum();
    let mut minus_sum: f64 = minus_dm.iter().take(period).sum();
    let mut adx_value: Option<f64> = None;

    for i in period..tr.len() {
        tr_sum = tr_sum - tr_sum / period as f64 + tr[i];
        plus_sum = plus_sum - plus_sum / period as f64 + plus_dm[i];
        minus_sum = minus_sum - minus_sum / period as f64 + minus_dm[i];

        let dx = if tr_sum == 0.0 {
            0.0
        } else {
            let plus_di = 100.0 * plus_sum / tr_sum;
            let minus_di = 100.0 * minus_sum / tr_sum;
            let di_sum = plus_di + minus_di;
            if di_sum == 0.0 {
                0.0
            } else {
                (plus_di - minus_di).abs() / di_sum * 100.0
            }
        };

        adx_value = Some(match adx_value {
            None => dx,
            Some(prev) => (prev * (period - 1) as f64 + dx) / period as f64,
        });

        // TR index i covers candles i and i + 1.
        out[i + 1] = adx_value;
    }

    out
}
