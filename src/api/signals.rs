//! Signal endpoints.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::analysis::{analyze, predict, quick_scan, Prediction};
use crate::error::Result;
use crate::types::{Direction, SignalRecord};
use crate::AppState;

const ANALYZE_CANDLE_LIMIT: usize = 100;

/// Query parameters for the live-signals listing.
#[derive(Debug, Deserialize)]
pub struct SignalsQuery {
    /// Strength tier: strong (>70), medium (40–70) or weak (<40).
    pub strength: Option<String>,
    #[serde(rename = "type")]
    pub direction: Option<Direction>,
    pub symbol: Option<String>,
}

/// Query parameters for on-demand analysis.
#[derive(Debug, Deserialize)]
pub struct AnalyzeQuery {
    pub symbol: String,
    pub timeframe: Option<String>,
    /// `quick` selects the lightweight crossover scan.
    pub strategy: Option<String>,
}

/// Create the signals router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_signals))
        .route("/analyze", get(analyze_pair))
        .route("/predict", get(predict_pair))
}

/// Current scanner snapshot, filtered and sorted strongest-first.
async fn get_signals(
    State(state): State<AppState>,
    Query(query): Query<SignalsQuery>,
) -> Json<Vec<SignalRecord>> {
    let signals = state
        .scanner
        .snapshot()
        .into_iter()
        .filter(|s| match query.strength.as_deref() {
            Some("strong") => s.strength > 70.0,
            Some("medium") => (40.0..=70.0).contains(&s.strength),
            Some("weak") => s.strength < 40.0,
            _ => true,
        })
        .filter(|s| query.direction.map_or(true, |d| s.direction == d))
        .filter(|s| {
            query
                .symbol
                .as_deref()
                .map_or(true, |symbol| s.symbol == symbol)
        })
        .collect();

    Json(signals)
}

/// Run one analysis pass on demand.
async fn analyze_pair(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<Json<Vec<SignalRecord>>> {
    let timeframe = query.timeframe.as_deref().unwrap_or("1m");
    let candles = state
        .binance
        .fetch_candles(&query.symbol, timeframe, ANALYZE_CANDLE_LIMIT)
        .await?;

    let signals = match query.strategy.as_deref() {
        Some("quick") => quick_scan(&candles, &query.symbol, timeframe),
        _ => analyze(&candles, &query.symbol, timeframe),
    };

    Ok(Json(signals))
}

/// Short-horizon drift prediction; `null` when history is too short.
async fn predict_pair(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<Json<Option<Prediction>>> {
    let timeframe = query.timeframe.as_deref().unwrap_or("1m");
    let candles = state
        .binance
        .fetch_candles(&query.symbol, timeframe, ANALYZE_CANDLE_LIMIT)
        .await?;

    Ok(Json(predict(&candles)))
}
