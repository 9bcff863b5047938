use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::error::{AppError, Result};
use crate::types::Candle;

const BINANCE_API_URL: &str = "https://api.binance.com/api/v3";

/// Intervals accepted by the candle endpoints; anything else falls back to 1m.
const INTERVALS: &[&str] = &["1m", "5m", "15m", "30m", "1h", "4h", "1d"];

/// Stablecoin and fiat pairs excluded from the symbol universe.
const EXCLUDED_PAIRS: &[&str] = &[
    "USDCUSDT", "BUSDUSDT", "TUSDUSDT", "USDPUSDT", "FDUSDUSDT", "USDTTRY", "USDTARS", "USDTBRL",
    "USDTBIDR", "USDTRUB", "USDTIDRT", "USDTUAH", "USDTGYEN", "USDTGBP", "USDTEUR", "USDTCOP",
    "TSTUSDT", "PNUTUSDT",
];

/// Markers of leveraged tokens, also excluded.
const LEVERAGED_MARKERS: &[&str] = &["UP", "DOWN", "BULL", "BEAR"];

/// Binance 24hr ticker response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceTicker {
    pub symbol: String,
    pub last_price: String,
    pub quote_volume: String,
}

/// Binance REST client.
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    api_key: Option<String>,
}

impl BinanceClient {
    /// Create a new Binance client.
    pub fn new(api_key: Option<String>) -> Self {
        let client = Client::builder()
            .user_agent("Vigil/1.0")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, api_key }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url);
        if let Some(ref key) = self.api_key {
            request = request.header("X-MBX-APIKEY", key);
        }
        request
    }

    /// Fetch an ordered candle sequence for a symbol and timeframe.
    ///
    /// Non-200 responses and malformed payloads surface as
    /// [`AppError::Upstream`]; the caller's single analysis aborts, nothing
    /// else does.
    pub async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let interval = normalize_interval(timeframe);
        let url = format!(
            "{}/klines?symbol={}&interval={}&limit={}",
            BINANCE_API_URL,
            symbol.to_uppercase(),
            interval,
            limit
        );

        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("klines request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                "Binance klines returned {}: {}",
                status,
                &text[..text.len().min(200)]
            );
            return Err(AppError::Upstream(format!(
                "Binance klines error: {status}"
            )));
        }

        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("failed to decode klines: {e}")))?;

        rows.iter()
            .map(|row| {
                parse_kline(row)
                    .ok_or_else(|| AppError::Upstream("malformed kline row".to_string()))
            })
            .collect()
    }

    /// Latest traded price for a symbol (close of the most recent 1m bar).
    pub async fn latest_price(&self, symbol: &str) -> Result<f64> {
        let candles = self.fetch_candles(symbol, "1m", 1).await?;
        candles
            .last()
            .map(|c| c.close)
            .ok_or_else(|| AppError::Upstream(format!("no price data for {symbol}")))
    }

    /// Top trading pairs for a quote asset, ranked by 24h quote volume.
    pub async fn top_symbols(
        &self,
        quote_asset: &str,
        min_quote_volume: f64,
        max_symbols: usize,
    ) -> Result<Vec<String>> {
        let url = format!("{}/ticker/24hr", BINANCE_API_URL);

        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("ticker request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Binance ticker error: {}",
                response.status()
            )));
        }

        let tickers: Vec<BinanceTicker> = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("failed to decode tickers: {e}")))?;

        Ok(rank_symbols(
            &tickers,
            quote_asset,
            min_quote_volume,
            max_symbols,
        ))
    }
}

/// Map a requested timeframe onto a supported kline interval.
pub fn normalize_interval(timeframe: &str) -> &str {
    if INTERVALS.contains(&timeframe) {
        timeframe
    } else {
        "1m"
    }
}

/// Parse one kline row (`[openTime, open, high, low, close, volume, ...]`).
fn parse_kline(row: &serde_json::Value) -> Option<Candle> {
    let arr = row.as_array()?;
    let field = |i: usize| arr.get(i)?.as_str()?.parse::<f64>().ok();

    Some(Candle {
        time: arr.first()?.as_i64()?,
        open: field(1)?,
        high: field(2)?,
        low: field(3)?,
        close: field(4)?,
        volume: field(5)?,
    })
}

/// Filter tickers to tradable pairs and rank by quote volume, descending.
fn rank_symbols(
    tickers: &[BinanceTicker],
    quote_asset: &str,
    min_quote_volume: f64,
    max_symbols: usize,
) -> Vec<String> {
    let mut pairs: Vec<(&str, f64)> = tickers
        .iter()
        .filter(|t| t.symbol.ends_with(quote_asset))
        .filter(|t| !EXCLUDED_PAIRS.contains(&t.symbol.as_str()))
        .filter(|t| {
            let base = &t.symbol[..t.symbol.len() - quote_asset.len()];
            !LEVERAGED_MARKERS.iter().any(|m| base.contains(m))
        })
        .filter_map(|t| {
            let volume: f64 = t.quote_volume.parse().ok()?;
            (volume >= min_quote_volume).then_some((t.symbol.as_str(), volume))
        })
        .collect();

    pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
    pairs
        .into_iter()
        .take(max_symbols)
        .map(|(symbol, _)| symbol.to_string())
        .collect()
}
