//! Market analyzer: entry-gate evaluation and signal emission.

use tracing::debug;

use crate::config::{MIN_CANDLES, MIN_RISK_REWARD, MIN_SIGNAL_STRENGTH};
use crate::types::{closes, Candle, Direction, IndicatorSnapshot, SignalRecord};

use super::indicators::{
    adx, atr, bollinger, ema, fair_value_gaps, fibonacci_levels, last_defined, macd, rsi,
    stochastic, volume_increase,
};
use super::risk::compute_tp_sl;
use super::strength::{composite_strength, StrengthInput};

/// Strategy label stamped on emitted signals.
pub const STRATEGY: &str = "Advanced Scalping Strategy";

/// EMA alignment tolerances: long wants the short EMA at or above 99% of the
/// long EMA, short wants it at or below 101%.
const EMA_TOLERANCE_LONG: f64 = 0.99;
const EMA_TOLERANCE_SHORT: f64 = 1.01;

/// Volume-increase ratio required at the entry gate.
const VOLUME_GATE: f64 = 1.1;

/// Minimum ADX for the market to count as trending.
const ADX_GATE: f64 = 15.0;

/// MACD magnitude that counts as directional agreement.
const MACD_AGREEMENT: f64 = 0.002;

/// Evaluate one (symbol, timeframe) pair and emit zero or more signals.
///
/// Pure: no shared state is touched; fewer than [`MIN_CANDLES`] candles is a
/// defined empty result, not an error. Both directions are evaluated against
/// the same displacement gates (Fibonacci band, fair-value gap, volume, ADX);
/// direction enters through the EMA alignment, MACD sign, Bollinger side and
/// the scorer's RSI tiers.
pub fn analyze(candles: &[Candle], symbol: &str, timeframe: &str) -> Vec<SignalRecord> {
    if candles.len() < MIN_CANDLES {
        return Vec::new();
    }
    let Some(last_candle) = candles.last() else {
        return Vec::new();
    };
    let price = last_candle.close;

    let prices = closes(candles);
    let ema9 = ema(&prices, 9);
    let ema20 = ema(&prices, 20);
    let rsi14 = rsi(&prices, 14);
    let stoch = stochastic(&prices, 14);
    let adx14 = adx(candles, 14);
    let atr14 = atr(candles, 14);
    let vol_increase = volume_increase(candles, 10);
    let bands = bollinger(&prices, 20, 2.0);
    let macd_lines = macd(&prices, 12, 26, 9);

    let (Some(&last_ema9), Some(&last_ema20)) = (ema9.last(), ema20.last()) else {
        return Vec::new();
    };
    let (Some(last_rsi), Some(last_adx)) = (last_defined(&rsi14), last_defined(&adx14)) else {
        return Vec::new();
    };
    let Some(band) = bands.last().copied().flatten() else {
        return Vec::new();
    };
    let Some(last_macd) = macd_lines.last_macd() else {
        return Vec::new();
    };

    let high = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let low = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let fib = fibonacci_levels(high, low);
    let gaps = fair_value_gaps(candles);

    debug!(
        symbol,
        timeframe,
        price,
        rsi = last_rsi,
        adx = last_adx,
        stochastic = ?last_defined(&stoch),
        gaps = gaps.len(),
        "analyzer pass"
    );

    // Direction-neutral displacement gates.
    let displaced = fib.displaced(price);
    let in_gap = gaps.first().map_or(false, |g| g.contains(price));
    let volume_surge = vol_increase > VOLUME_GATE;
    let trending = last_adx > ADX_GATE;

    if !(displaced && in_gap && volume_surge && trending) {
        return Vec::new();
    }

    let mut signals = Vec::new();

    for direction in [Direction::Long, Direction::Short] {
        let ema_aligned = match direction {
            Direction::Long => last_ema9 > last_ema20 * EMA_TOLERANCE_LONG,
            Direction::Short => last_ema9 < last_ema20 * EMA_TOLERANCE_SHORT,
        };
        if !ema_aligned {
            continue;
        }

        let levels = compute_tp_sl(candles, direction, price, atr14);
        let (risk, reward) = match direction {
            Direction::Long => (price - levels.sl, levels.tp - price),
            Direction::Short => (levels.sl - price, price - levels.tp),
        };
        if risk <= 0.0 {
            continue;
        }
        let risk_reward = reward / risk;
        if risk_reward < MIN_RISK_REWARD {
            continue;
        }

        let macd_aligned = match direction {
            Direction::Long => last_macd > MACD_AGREEMENT,
            Direction::Short => last_macd < -MACD_AGREEMENT,
        };
        let bb_favorable = match direction {
            Direction::Long => price < band.middle,
            Direction::Short => price > band.middle,
        };

        let strength = composite_strength(&StrengthInput {
            direction,
            rsi: last_rsi,
            trend_confirmed: true,
            macd_aligned,
            bb_favorable,
            volume_increase: vol_increase,
            risk_reward,
        });
        if strength < MIN_SIGNAL_STRENGTH {
            continue;
        }

        signals.push(SignalRecord {
            direction,
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            price,
            tp: levels.tp,
            sl: levels.sl,
            time: last_candle.time,
            strength,
            strategy: STRATEGY.to_string(),
            indicators: IndicatorSnapshot {
                ema_trend: match direction {
                    Direction::Long => "Bullish Setup".to_string(),
                    Direction::Short => "Bearish Setup".to_string(),
                },
                rsi: format!("{last_rsi:.2}"),
                macd: format!("{last_macd:.8}"),
                bb_position: if bb_favorable {
                    "Favorable".to_string()
                } else {
                    "Neutral".to_string()
                },
                volume: format!("{vol_increase:.2}x"),
                atr: format!("{atr14:.8}"),
                risk_reward: format!("{risk_reward:.2}"),
            },
            test_id: None,
        });
    }

    signals
}
