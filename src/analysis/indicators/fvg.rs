//! Fair-value-gap detection.

use crate::types::Candle;

/// A price interval skipped between non-overlapping candle wicks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FairValueGap {
    pub start: f64,
    pub end: f64,
}

impl FairValueGap {
    pub fn contains(&self, price: f64) -> bool {
        price >= self.start && price <= self.end
    }
}

/// Scan consecutive candle triples for fair value gaps.
///
/// Bar `i` flags a gap when its low clears the next bar's high while the
/// previous bar's high sits below it; the reported interval is
/// `[previous high, current low]`.
pub fn fair_value_gaps(candles: &[Candle]) -> Vec<FairValueGap> {
    let mut gaps = Vec::new();

    for i in 1..candles.len().saturating_sub(1) {
        let current_low = candles[i].low;
        let next_high = candles[i + 1].high;
        let previous_high = candles[i - 1].high;

        if current_low > next_high && previous_high < current_low {
            gaps.push(FairValueGap {
                start: previous_high,
                end: current_low,
            });
        }
    }

    gaps
}
