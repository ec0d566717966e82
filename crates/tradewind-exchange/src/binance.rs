use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tradewind_core::config::ExchangeConfig;
use tradewind_core::FuturesSymbol;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Candlestick intervals the futures API accepts.
pub const SUPPORTED_INTERVALS: &[&str] = &[
    "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w", "1M",
];

/// Client for the Binance USDT-margined futures REST API.
///
/// Kline reads are public endpoints; the API key header is only attached
/// when one is configured, which raises the rate limit ceiling.
pub struct BinanceFutures {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl BinanceFutures {
    pub fn new(config: &ExchangeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.binance_futures_base_url.clone(),
            api_key: config.binance_api_key.clone(),
        }
    }

    /// Fetch candlesticks for a symbol. `start_time` and `end_time` are
    /// millisecond timestamps; the API caps `limit` at 1500.
    pub async fn get_klines(
        &self,
        symbol: FuturesSymbol,
        interval: &str,
        limit: u32,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> Result<Vec<Kline>, ExchangeError> {
        if !SUPPORTED_INTERVALS.contains(&interval) {
            return Err(ExchangeError::UnsupportedInterval(interval.to_string()));
        }

        let mut params = vec![
            ("symbol", symbol.as_str().to_string()),
            ("interval", interval.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(start) = start_time {
            params.push(("startTime", start.to_string()));
        }
        if let Some(end) = end_time {
            params.push(("endTime", end.to_string()));
        }

        debug!(symbol = %symbol, interval, limit, "fetching binance futures klines");

        let url = format!("{}/fapi/v1/klines", self.base_url);
        let mut req = self
            .client
            .get(&url)
            .query(&params)
            .timeout(REQUEST_TIMEOUT);
        if let Some(key) = &self.api_key {
            req = req.header("X-MBX-APIKEY", key);
        }

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status, body = %body, "Binance API error");
            return Err(ExchangeError::Api { status, body });
        }

        let rows: Vec<RawKline> = resp
            .json()
            .await
            .map_err(|e| ExchangeError::Parse(e.to_string()))?;
        Ok(rows.into_iter().map(Kline::from).collect())
    }
}

/// One candlestick, every field stringified the way the analysis prompt
/// consumes it.
#[derive(Debug, Clone, Serialize)]
pub struct Kline {
    pub open_time: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
    pub close_time: String,
    pub quote_asset_volume: String,
    pub number_of_trades: String,
    pub taker_buy_base_asset_volume: String,
    pub taker_buy_quote_asset_volume: String,
}

// Raw kline row as the API sends it: a 12-element array of mixed numbers
// and strings, the last element reserved.
#[derive(Deserialize)]
struct RawKline(
    i64,
    String,
    String,
    String,
    String,
    String,
    i64,
    String,
    i64,
    String,
    String,
    #[allow(dead_code)] serde_json::Value,
);

impl From<RawKline> for Kline {
    fn from(raw: RawKline) -> Self {
        Self {
            open_time: raw.0.to_string(),
            open: raw.1,
            high: raw.2,
            low: raw.3,
            close: raw.4,
            volume: raw.5,
            close_time: raw.6.to_string(),
            quote_asset_volume: raw.7,
            number_of_trades: raw.8.to_string(),
            taker_buy_base_asset_volume: raw.9,
            taker_buy_quote_asset_volume: raw.10,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("unsupported interval: {0}")]
    UnsupportedInterval(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),
}
