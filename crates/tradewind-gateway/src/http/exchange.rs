//! Binance USDⓈ-M futures market data endpoints.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use tradewind_core::FuturesSymbol;
use tradewind_exchange::{ExchangeError, Kline};

use crate::app::AppState;
use crate::http::{error_response, ErrorBody};

#[derive(Deserialize)]
pub struct KlinesQuery {
    pub symbol: FuturesSymbol,
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

fn default_interval() -> String {
    "1h".to_string()
}

fn default_limit() -> u32 {
    500
}

#[derive(Serialize)]
pub struct KlinesResponse {
    pub symbol: String,
    pub interval: String,
    pub klines: Vec<Kline>,
}

/// GET /api/exchange/binance/futures/klines fetches candlestick data.
pub async fn get_klines(
    State(state): State<Arc<AppState>>,
    Query(query): Query<KlinesQuery>,
) -> Result<Json<KlinesResponse>, (StatusCode, Json<ErrorBody>)> {
    if query.limit == 0 || query.limit > 1500 {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "limit must be between 1 and 1500",
        ));
    }

    match state
        .exchange
        .get_klines(
            query.symbol,
            &query.interval,
            query.limit,
            query.start_time,
            query.end_time,
        )
        .await
    {
        Ok(klines) => Ok(Json(KlinesResponse {
            symbol: query.symbol.to_string(),
            interval: query.interval,
            klines,
        })),
        Err(e @ ExchangeError::UnsupportedInterval(_)) => {
            Err(error_response(StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(e) => {
            warn!(symbol = %query.symbol, error = %e, "kline fetch failed");
            Err(error_response(StatusCode::BAD_GATEWAY, e.to_string()))
        }
    }
}

/// GET /api/exchange/binance/futures/symbols lists the supported pairs.
pub async fn get_symbols() -> Json<Value> {
    let symbols: Vec<&str> = FuturesSymbol::all().iter().map(|s| s.as_str()).collect();
    Json(json!({
        "count": symbols.len(),
        "symbols": symbols,
    }))
}
