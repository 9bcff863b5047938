//! Dynamic take-profit / stop-loss sizing.

use crate::config::MIN_RISK_REWARD;
use crate::types::{closes, Candle, Direction};

use super::indicators::true_range;

/// Stop distance as a fraction of price when ATR is unusable.
const FALLBACK_SL_PCT: f64 = 0.005;

/// Cap on the take-profit inflation loop.
const MAX_RR_ITERATIONS: usize = 50;

/// Computed take-profit and stop-loss price levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TpSl {
    pub tp: f64,
    pub sl: f64,
}

/// Mean true range over the entire provided window.
///
/// Deliberately wider than the ATR lookback; the risk engine compares this
/// window-wide volatility against the recent ATR.
pub fn mean_true_range(candles: &[Candle]) -> f64 {
    if candles.len() < 2 {
        return 0.0;
    }
    let tr: Vec<f64> = candles
        .windows(2)
        .map(|w| true_range(&w[1], &w[0]))
        .collect();
    tr.iter().sum::<f64>() / tr.len() as f64
}

/// Magnitude of the mean bar-to-bar return over the window.
pub fn trend_strength(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let returns: Vec<f64> = values
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    if returns.is_empty() {
        return 0.0;
    }
    (returns.iter().sum::<f64>() / returns.len() as f64).abs()
}

/// Take-profit and stop-loss levels sized from ATR, adjusted for trend and
/// volatility context, with a hard risk:reward floor.
///
/// A zero (or non-finite) ATR short-circuits to fixed fractional distances
/// instead of looping or dividing by zero.
pub fn compute_tp_sl(candles: &[Candle], direction: Direction, price: f64, atr: f64) -> TpSl {
    if !(atr > 0.0) {
        return fallback(direction, price);
    }

    let volatility = mean_true_range(candles);
    let trend = trend_strength(&closes(candles));

    let mut tp_mult = 2.0;
    let mut sl_mult = 1.0;

    if trend > 0.02 {
        // Strong trend: stretch the target, tighten the stop.
        tp_mult *= 1.5;
        sl_mult *= 0.8;
    } else if trend < 0.005 {
        tp_mult *= 0.8;
        sl_mult *= 1.2;
    }

    if volatility > atr * 2.0 {
        tp_mult *= 1.3;
        sl_mult *= 0.7;
    } else if volatility < atr * 0.5 {
        tp_mult *= 0.7;
        sl_mult *= 1.3;
    }

    let mut tp_distance = atr * tp_mult;
    let sl_distance = atr * sl_mult;

    if !(sl_distance > 0.0) {
        return fallback(direction, price);
    }

    let mut iterations = 0;
    while tp_distance / sl_distance < MIN_RISK_REWARD && iterations < MAX_RR_ITERATIONS {
        tp_distance *= 1.1;
        iterations += 1;
    }

    at_distances(direction, price, tp_distance, sl_distance)
}

fn fallback(direction: Direction, price: f64) -> TpSl {
    let sl_distance = price * FALLBACK_SL_PCT;
    let tp_distance = sl_distance * MIN_RISK_REWARD;
    at_distances(direction, price, tp_distance, sl_distance)
}

fn at_distances(direction: Direction, price: f64, tp_distance: f64, sl_distance: f64) -> TpSl {
    match direction {
        Direction::Long => TpSl {
            tp: price + tp_distance,
            sl: price - sl_distance,
        },
        Direction::Short => TpSl {
            tp: price - tp_distance,
            sl: price + sl_distance,
        },
    }
}
