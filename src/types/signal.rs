use serde::{Deserialize, Serialize};

/// Direction of a trade suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Get display label for this direction.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }
}

/// Display-formatted indicator readings attached to a signal.
///
/// Values are pre-formatted strings; the dashboard renders them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub ema_trend: String,
    pub rsi: String,
    pub macd: String,
    pub bb_position: String,
    pub volume: String,
    pub atr: String,
    pub risk_reward: String,
}

/// A scored entry suggestion for a (symbol, timeframe) pair.
///
/// Immutable once emitted, except for `test_id` which is set when the
/// signal is promoted to a paper test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRecord {
    #[serde(rename = "type")]
    pub direction: Direction,
    pub symbol: String,
    pub timeframe: String,
    /// Suggested entry price.
    pub price: f64,
    /// Take-profit level.
    pub tp: f64,
    /// Stop-loss level.
    pub sl: f64,
    /// Epoch milliseconds of the candle the signal was derived from.
    pub time: i64,
    /// Composite strength in [0, 100].
    pub strength: f64,
    pub strategy: String,
    pub indicators: IndicatorSnapshot,
    /// Set once the signal has been promoted to a paper test.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
}

impl SignalRecord {
    /// Cache key for the scanner's merge policy.
    pub fn key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.symbol,
            self.timeframe,
            match self.direction {
                Direction::Long => "long",
                Direction::Short => "short",
            }
        )
    }
}
