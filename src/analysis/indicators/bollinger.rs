//! Bollinger Bands.

use super::sma;

/// One band triple: middle is the SMA, upper/lower sit `k` population
/// standard deviations away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Bollinger Bands over a close series.
///
/// Aligned to the input; the first `period - 1` entries are `None`. The
/// standard deviation uses divisor `period` (population form), matching the
/// middle band's window.
pub fn bollinger(values: &[f64], period: usize, k: f64) -> Vec<Option<Band>> {
    let middles = sma(values, period);

    middles
        .iter()
        .enumerate()
        .map(|(i, middle)| {
            let middle = (*middle)?;
            let window = &values[i + 1 - period..=i];
            let variance =
                window.iter().map(|v| (v - middle).powi(2)).sum::<f64>() / period as f64;
            let band = k * variance.sqrt();
            Some(Band {
                upper: middle + band,
                middle,
                lower: middle - band,
            })
        })
        .collect()
}
