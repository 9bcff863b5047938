//! Short-horizon price direction predictor.
//!
//! Votes three cheap features over the last ten candles — momentum, volume
//! trend and a two-bar ladder pattern — into an up/down call with a
//! majority-based confidence.

use serde::{Deserialize, Serialize};

use crate::types::Candle;

/// Number of trailing candles the predictor inspects.
const WINDOW: usize = 10;

/// Predicted drift direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Drift {
    Up,
    Down,
}

/// Prediction output: direction plus the share of agreeing votes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Prediction {
    pub direction: Drift,
    /// Percentage of the three feature votes backing the direction.
    pub confidence: f64,
}

/// Predict near-term drift from the last ten candles.
///
/// Returns `None` with fewer than ten candles of history.
pub fn predict(candles: &[Candle]) -> Option<Prediction> {
    if candles.len() < WINDOW {
        return None;
    }
    let recent = &candles[candles.len() - WINDOW..];
    let closes: Vec<f64> = recent.iter().map(|c| c.close).collect();
    let volumes: Vec<f64> = recent.iter().map(|c| c.volume).collect();

    let momentum = momentum(&closes);
    let volume_trend = volume_trend(&volumes);
    let pattern = ladder_pattern(&closes);

    let mut up_votes = 0u32;
    let mut down_votes = 0u32;

    if momentum > 0.0 {
        up_votes += 1;
    } else if momentum < 0.0 {
        down_votes += 1;
    }

    if volume_trend > 0.0 {
        up_votes += 1;
    } else if volume_trend < 0.0 {
        down_votes += 1;
    }

    match pattern {
        Some(Drift::Up) => up_votes += 1,
        Some(Drift::Down) => down_votes += 1,
        None => {}
    }

    let direction = if up_votes > down_votes {
        Drift::Up
    } else {
        Drift::Down
    };
    let confidence = up_votes.max(down_votes) as f64 / 3.0 * 100.0;

    Some(Prediction {
        direction,
        confidence,
    })
}

/// Five-bar mean minus ten-bar mean.
fn momentum(closes: &[f64]) -> f64 {
    let sma5 = closes[closes.len() - 5..].iter().sum::<f64>() / 5.0;
    let sma10 = closes.iter().sum::<f64>() / closes.len() as f64;
    sma5 - sma10
}

/// Recent three-bar volume mean minus the window's opening three-bar mean.
fn volume_trend(volumes: &[f64]) -> f64 {
    let recent = volumes[volumes.len() - 3..].iter().sum::<f64>() / 3.0;
    let old = volumes[..3].iter().sum::<f64>() / 3.0;
    recent - old
}

/// Every close above (below) the close two bars earlier.
fn ladder_pattern(closes: &[f64]) -> Option<Drift> {
    let bullish = (2..closes.len()).all(|i| closes[i] > closes[i - 2]);
    let bearish = (2..closes.len()).all(|i| closes[i] < closes[i - 2]);

    if bullish {
        Some(Drift::Up)
    } else if bearish {
        Some(Drift::Down)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles(closes: &[f64], volumes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .zip(volumes.iter())
            .enumerate()
            .map(|(i, (close, volume))| Candle {
                time: i as i64,
                open: *close,
                high: close + 1.0,
                low: close - 1.0,
                close: *close,
                volume: *volume,
            })
            .collect()
    }

    #[test]
    fn test_predict_needs_ten_candles() {
        let closes = [100.0; 9];
        let volumes = [1000.0; 9];
        assert!(predict(&candles(&closes, &volumes)).is_none());
    }

    #[test]
    fn test_climbing_market_predicts_up() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let volumes: Vec<f64> = (0..10).map(|i| 1000.0 + i as f64 * 100.0).collect();
        let prediction = predict(&candles(&closes, &volumes)).unwrap();
        assert_eq!(prediction.direction, Drift::Up);
        assert!((prediction.confidence - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_falling_market_predicts_down() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 - i as f64).collect();
        let volumes: Vec<f64> = (0..10).map(|i| 2000.0 - i as f64 * 100.0).collect();
        let prediction = predict(&candles(&closes, &volumes)).unwrap();
        assert_eq!(prediction.direction, Drift::Down);
        assert!((prediction.confidence - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_is_vote_share() {
        // Momentum up, volume down, no pattern: 1 vs 1 → confidence 1/3.
        let closes = [100.0, 101.0, 99.0, 102.0, 98.0, 103.0, 104.0, 105.0, 104.5, 105.5];
        let volumes = [2000.0, 2000.0, 2000.0, 1500.0, 1400.0, 1300.0, 1000.0, 1000.0, 1000.0, 1000.0];
        let prediction = predict(&candles(&closes, &volumes)).unwrap();
        assert!((0.0..=100.0).contains(&prediction.confidence));
        let share = prediction.confidence / 100.0 * 3.0;
        assert!((share - share.round()).abs() < 1e-9);
    }
}
