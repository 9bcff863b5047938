//! Technical indicator implementations.
//!
//! Pure, deterministic functions over ordered candle or close sequences.
//! Series-returning functions are aligned index-for-index with their input,
//! with `None` marking entries where the lookback is not yet satisfied —
//! callers must never treat `None` as zero. The one exception is [`ema`]
//! (and the MACD lines built from it), which returns an unpadded, shorter
//! series.
//!
//! This module is the single home for every formula; the analyzer, the
//! quick scan and the risk engine all share these implementations.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod fibonacci;
pub mod fvg;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod volume;

pub use adx::adx;
pub use atr::{atr, true_range};
pub use bollinger::{bollinger, Band};
pub use ema::ema;
pub use fibonacci::{fibonacci_levels, FibLevels};
pub use fvg::{fair_value_gaps, FairValueGap};
pub use macd::{macd, Macd};
pub use rsi::rsi;
pub use sma::sma;
pub use stochastic::stochastic;
pub use volume::volume_increase;

/// Last defined value of an aligned series.
pub fn last_defined(series: &[Option<f64>]) -> Option<f64> {
    series.iter().rev().flatten().next().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_defined_skips_trailing_none() {
        assert_eq!(last_defined(&[None, Some(1.0), Some(2.0)]), Some(2.0));
        assert_eq!(last_defined(&[None, None]), None);
        assert_eq!(last_defined(&[]), None);
    }
}
