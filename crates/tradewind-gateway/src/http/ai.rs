//! AI service endpoints.
//!
//! POST /api/ai/chat/trader is the route recurring scheduler jobs call: it
//! pulls recent candles from Binance futures and asks an AI service for a
//! trading recommendation. The other routes expose plain chat, embeddings
//! and runtime service configuration.
//!
//! Error: `{"error": "..."}`

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use tradewind_core::config::ProviderSettings;
use tradewind_core::FuturesSymbol;
use tradewind_exchange::{ExchangeError, Kline};
use tradewind_providers::service::{
    AiService, ChatCompletionRequest, ChatMessage, ProviderError, DEFAULT_MAX_TOKENS,
};

use crate::app::AppState;
use crate::http::{error_response, ErrorBody};

/// Temperature for plain chat requests that do not set their own. Trader
/// requests leave it unset so the service's stricter default applies.
const DEFAULT_CHAT_TEMPERATURE: f64 = 0.7;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub service: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

#[derive(Deserialize)]
pub struct ServiceConfigRequest {
    pub service: String,
    pub config: ProviderSettings,
}

#[derive(Deserialize)]
pub struct EmbeddingRequest {
    pub service: Option<String>,
    pub text: String,
    pub model: Option<String>,
}

#[derive(Deserialize)]
pub struct TraderChatRequest {
    pub symbol: FuturesSymbol,
    #[serde(default = "default_kline_interval")]
    pub kline_interval: String,
    #[serde(default = "default_kline_limit")]
    pub limit: u32,
    pub service: Option<String>,
    pub model: Option<String>,
}

fn default_kline_interval() -> String {
    "1h".to_string()
}

fn default_kline_limit() -> u32 {
    50
}

/// GET /api/ai/services returns the names of the live services.
pub async fn list_services(State(state): State<Arc<AppState>>) -> Json<Value> {
    let services = state.ai.list();
    Json(json!({
        "count": services.len(),
        "services": services,
        "default": state.ai.default_service(),
    }))
}

/// GET /api/ai/config returns per-service status, disabled ones included.
pub async fn get_service_config(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "services": state.ai.service_info() }))
}

/// POST /api/ai/config applies new settings to a service at runtime.
pub async fn update_service_config(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ServiceConfigRequest>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorBody>)> {
    if state.ai.configure_service(&req.service, req.config) {
        Ok(Json(json!({
            "message": format!("Service {} configured successfully", req.service)
        })))
    } else {
        Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("Failed to configure service {}", req.service),
        ))
    }
}

/// POST /api/ai/chat forwards a conversation to the chosen service and
/// returns the raw provider response.
pub async fn chat_completion(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorBody>)> {
    let service = resolve_service(&state, req.service.as_deref())?;

    let request = ChatCompletionRequest {
        messages: req.messages,
        model: req.model,
        temperature: req.temperature.or(Some(DEFAULT_CHAT_TEMPERATURE)),
        max_tokens: req.max_tokens.or(Some(DEFAULT_MAX_TOKENS)),
        stream: false,
    };
    match service.chat_completion(&request).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            warn!(service = %service.name(), error = %e, "chat completion failed");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
            ))
        }
    }
}

/// POST /api/ai/embedding embeds a text with the chosen service.
pub async fn embedding(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmbeddingRequest>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorBody>)> {
    let service = resolve_service(&state, req.service.as_deref())?;

    match service.embedding(&req.text, req.model.as_deref()).await {
        Ok(vector) => Ok(Json(json!({
            "dimension": vector.len(),
            "embedding": vector,
        }))),
        Err(ProviderError::NotSupported(msg)) => Err(error_response(StatusCode::BAD_REQUEST, msg)),
        Err(e) => {
            warn!(service = %service.name(), error = %e, "embedding failed");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
            ))
        }
    }
}

/// POST /api/ai/chat/trader runs one round of trade analysis: fetch recent
/// candles, build the analyst prompt, return the provider's verdict.
pub async fn chat_trader(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TraderChatRequest>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorBody>)> {
    let service = resolve_service(&state, req.service.as_deref())?;

    let klines = match state
        .exchange
        .get_klines(req.symbol, &req.kline_interval, req.limit, None, None)
        .await
    {
        Ok(klines) => klines,
        Err(e @ ExchangeError::UnsupportedInterval(_)) => {
            return Err(error_response(StatusCode::BAD_REQUEST, e.to_string()));
        }
        Err(e) => {
            warn!(symbol = %req.symbol, error = %e, "kline fetch failed");
            return Err(error_response(StatusCode::BAD_GATEWAY, e.to_string()));
        }
    };
    if klines.is_empty() {
        return Err(error_response(
            StatusCode::BAD_GATEWAY,
            format!("no kline data for {}", req.symbol),
        ));
    }

    info!(
        symbol = %req.symbol,
        service = %service.name(),
        candles = klines.len(),
        "running trade analysis"
    );

    let request = ChatCompletionRequest {
        messages: trader_messages(req.symbol, &req.kline_interval, &klines),
        model: req.model,
        temperature: None,
        max_tokens: None,
        stream: false,
    };
    match service.chat_completion(&request).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            warn!(service = %service.name(), error = %e, "trade analysis failed");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
            ))
        }
    }
}

fn resolve_service(
    state: &AppState,
    requested: Option<&str>,
) -> Result<Arc<dyn AiService>, (StatusCode, Json<ErrorBody>)> {
    let name = requested.unwrap_or_else(|| state.ai.default_service());
    state.ai.get(name).ok_or_else(|| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("Service {name} not available. Please check configuration."),
        )
    })
}

/// Build the analyst prompt from raw candle data.
fn trader_messages(symbol: FuturesSymbol, interval: &str, klines: &[Kline]) -> Vec<ChatMessage> {
    let mut table = String::from("open_time,open,high,low,close,volume\n");
    for k in klines {
        table.push_str(&format!(
            "{},{},{},{},{},{}\n",
            k.open_time, k.open, k.high, k.low, k.close, k.volume
        ));
    }
    vec![
        ChatMessage::system(
            "You are a seasoned cryptocurrency futures analyst. Given recent \
             candlestick data, assess the trend and respond with a concise trading \
             recommendation: direction, entry, stop loss and take profit.",
        ),
        ChatMessage::user(format!(
            "Symbol: {symbol}\nKline interval: {interval}\nMost recent {} candles (oldest first):\n{table}",
            klines.len()
        )),
    ]
}
