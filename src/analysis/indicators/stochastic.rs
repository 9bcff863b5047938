//! Stochastic oscillator (%K).

/// %K over a trailing window of closes:
/// `(close - lowest) / (highest - lowest) * 100`.
///
/// Aligned to the input; the first `period - 1` entries are `None`. A
/// zero-range window yields `Some(0.0)` — explicitly zero, not undefined.
pub fn stochastic(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    values
        .iter()
        .enumerate()
        .map(|(i, current)| {
            if i + 1 < period {
                return None;
            }
            let window = &values[i + 1 - period..=i];
            let lowest = window.iter().copied().fold(f64::INFINITY, f64::min);
            let highest = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let range = highest - lowest;
            if range == 0.0 {
                Some(0.0)
            } else {
                Some((current - lowest) / range * 100.0)
            }
        })
        .collect()
}
