//! Lightweight crossover scan.
//!
//! A cheaper companion to the full analyzer: SMA(9)/SMA(21) approaching a
//! cross plus an RSI extreme, with fixed percentage exits. Emits with a
//! confidence score and intentionally applies no minimum-strength filter —
//! callers see every candidate.

use crate::types::{closes, Candle, Direction, IndicatorSnapshot, SignalRecord};

use super::indicators::{last_defined, rsi, sma};

/// Strategy label stamped on quick-scan signals.
pub const STRATEGY: &str = "Technical Analysis";

const SHORT_PERIOD: usize = 9;
const LONG_PERIOD: usize = 21;
const RSI_PERIOD: usize = 14;

/// Scan for a near-crossover setup on the last candle.
pub fn quick_scan(candles: &[Candle], symbol: &str, timeframe: &str) -> Vec<SignalRecord> {
    let prices = closes(candles);
    if prices.len() < LONG_PERIOD + 1 {
        return Vec::new();
    }
    let Some(last_candle) = candles.last() else {
        return Vec::new();
    };
    let price = last_candle.close;

    let short_ma = sma(&prices, SHORT_PERIOD);
    let long_ma = sma(&prices, LONG_PERIOD);
    let rsi14 = rsi(&prices, RSI_PERIOD);

    let (Some(last_short), Some(last_long), Some(last_rsi)) = (
        last_defined(&short_ma),
        last_defined(&long_ma),
        last_defined(&rsi14),
    ) else {
        return Vec::new();
    };

    let prev_close = prices[prices.len() - 2];
    let price_change = if prev_close != 0.0 {
        (price - prev_close) / prev_close * 100.0
    } else {
        0.0
    };
    let ma_convergence = if last_long != 0.0 {
        (last_short - last_long) / last_long * 100.0
    } else {
        0.0
    };

    let mut signals = Vec::new();

    // Oversold with the short MA closing in on the long MA from below and
    // price stabilizing.
    let potential_long = last_rsi < 40.0
        && last_short > last_long * 0.995
        && last_short < last_long
        && price_change > -0.1;

    // Overbought with the short MA closing in from above.
    let potential_short = last_rsi > 60.0
        && last_short < last_long * 1.005
        && last_short > last_long
        && price_change < 0.1;

    if potential_long {
        signals.push(build_signal(
            Direction::Long,
            symbol,
            timeframe,
            price,
            price * 1.02,
            price * 0.99,
            last_candle.time,
            confidence(Direction::Long, last_rsi, ma_convergence),
            last_rsi,
        ));
    }

    if potential_short {
        signals.push(build_signal(
            Direction::Short,
            symbol,
            timeframe,
            price,
            price * 0.98,
            price * 1.01,
            last_candle.time,
            confidence(Direction::Short, last_rsi, ma_convergence),
            last_rsi,
        ));
    }

    signals
}

/// Confidence in [0, 100]: base 50, boosted by RSI depth and MA proximity.
fn confidence(direction: Direction, rsi: f64, ma_convergence: f64) -> f64 {
    let mut confidence = 50.0;
    match direction {
        Direction::Long => {
            confidence += (40.0 - rsi) * 1.5;
            confidence += (1.0 - ma_convergence) * 10.0;
        }
        Direction::Short => {
            confidence += (rsi - 60.0) * 1.5;
            confidence += (1.0 - ma_convergence.abs()) * 10.0;
        }
    }
    confidence.clamp(0.0, 100.0)
}

#[allow(clippy::too_many_arguments)]
fn build_signal(
    direction: Direction,
    symbol: &str,
    timeframe: &str,
    price: f64,
    tp: f64,
    sl: f64,
    time: i64,
    strength: f64,
    rsi: f64,
) -> SignalRecord {
    SignalRecord {
        direction,
        symbol: symbol.to_string(),
        timeframe: timeframe.to_string(),
        price,
        tp,
        sl,
        time,
        strength,
        strategy: STRATEGY.to_string(),
        indicators: IndicatorSnapshot {
            ema_trend: match direction {
                Direction::Long => "Approaching Bullish Cross".to_string(),
                Direction::Short => "Approaching Bearish Cross".to_string(),
            },
            rsi: format!("{rsi:.2}"),
            macd: "n/a".to_string(),
            bb_position: "n/a".to_string(),
            volume: "n/a".to_string(),
            atr: "n/a".to_string(),
            risk_reward: "2.00".to_string(),
        },
        test_id: None,
    }
}
