//! Relative Strength Index (RSI).

/// RSI over consecutive close differences with Wilder smoothing.
///
/// The seed averages consume the first `period` differences and the first
/// emitted value folds in the next one, so the leading `period + 1` entries
/// of the aligned output are `None`. When the trailing average loss is
/// exactly zero the value is 100 by definition, not a division error.
pub fn rsi(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period + 2 {
        return out;
    }

    let changes: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();

    let mut avg_gain = changes
        .iter()
        .take(period)
        .map(|c| c.max(0.0))
        .sum::<f64>()
        / period as f64;
    let mut avg_loss = changes
        .iter()
        .take(period)
        .map(|c| (-c).max(0.0))
        .sum::<f64>()
        / period as f64;

    for (i, change) in changes.iter().enumerate().skip(period) {
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;

        let value = if avg_loss == 0.0 {
            100.0
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - 100.0 / (1.0 + rs)
        };

        // Change i sits between values i and i + 1.
        out[i + 1] = Some(value);
    }

    out
}
