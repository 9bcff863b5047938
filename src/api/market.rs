//! Market data endpoints.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::Result;
use crate::types::Candle;
use crate::AppState;

const MAX_CANDLE_LIMIT: usize = 1000;

/// Query parameters for the candles endpoint.
#[derive(Debug, Deserialize)]
pub struct CandlesQuery {
    pub symbol: String,
    pub timeframe: Option<String>,
    pub limit: Option<usize>,
}

/// Create the market router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/candles", get(get_candles))
        .route("/symbols", get(get_symbols))
}

/// Fetch raw candles for a symbol/timeframe.
async fn get_candles(
    State(state): State<AppState>,
    Query(query): Query<CandlesQuery>,
) -> Result<Json<Vec<Candle>>> {
    let timeframe = query.timeframe.as_deref().unwrap_or("1m");
    let limit = query.limit.unwrap_or(100).min(MAX_CANDLE_LIMIT);
    let candles = state
        .binance
        .fetch_candles(&query.symbol, timeframe, limit)
        .await?;
    Ok(Json(candles))
}

/// Current symbol universe, refreshing it on a cold start.
async fn get_symbols(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let mut symbols = state.scanner.symbols();
    if symbols.is_empty() {
        state.scanner.refresh_symbols().await?;
        symbols = state.scanner.symbols();
    }
    Ok(Json(symbols))
}
