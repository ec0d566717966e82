use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use tradewind_core::config::ProviderSettings;

use crate::service::{
    AiService, ChatCompletionRequest, ProviderError, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
    REQUEST_TIMEOUT,
};

const DEFAULT_MODEL: &str = "moonshot-v1-8k";
const DEFAULT_EMBEDDING_MODEL: &str = "moonshot-ai/embedding-v1";

/// Kimi-compatible chat service.
///
/// Moonshot and SiliconFlow expose the same API on different hosts, so one
/// implementation covers both; the platform only decides which base URL to
/// talk to. An explicit `base_url` in the settings wins over the platform
/// lookup.
pub struct KimiService {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    service_name: String,
}

impl KimiService {
    pub fn new(settings: &ProviderSettings) -> Self {
        let base_url = match &settings.base_url {
            Some(url) => url.clone(),
            None => {
                let platform = settings.platform.as_deref().unwrap_or("default");
                platform_base_url(platform).to_string()
            }
        };
        let platform = detect_platform(&base_url);
        Self {
            client: reqwest::Client::new(),
            api_key: settings.api_key.clone(),
            base_url,
            model: settings
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            service_name: format!("kimi-{platform}"),
        }
    }
}

#[async_trait]
impl AiService for KimiService {
    fn name(&self) -> &str {
        &self.service_name
    }

    async fn chat_completion(&self, req: &ChatCompletionRequest) -> Result<Value, ProviderError> {
        let model = req.model.clone().unwrap_or_else(|| self.model.clone());
        let body = build_request_body(req, &model);
        let url = format!("{}/v1/chat/completions", self.base_url);

        debug!(model = %model, service = %self.service_name, "sending chat completion to Kimi");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let message = resp.text().await.unwrap_or_default();
            warn!(status, body = %message, "Kimi API error");
            return Err(ProviderError::Api { status, message });
        }

        resp.json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }

    async fn embedding(&self, text: &str, model: Option<&str>) -> Result<Vec<f64>, ProviderError> {
        let body = serde_json::json!({
            "model": model.unwrap_or(DEFAULT_EMBEDDING_MODEL),
            "input": text,
        });
        let url = format!("{}/v1/embeddings", self.base_url);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let message = resp.text().await.unwrap_or_default();
            warn!(status, body = %message, "Kimi embedding API error");
            return Err(ProviderError::Api { status, message });
        }

        let api_resp: EmbeddingResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        api_resp
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProviderError::Parse("embedding response had no data".to_string()))
    }
}

/// Endpoint for a well-known platform name. Unknown names fall back to the
/// Moonshot default.
fn platform_base_url(platform: &str) -> &'static str {
    match platform {
        "default" | "moonshot" | "cn" => "https://api.moonshot.cn",
        "siliconflow" => "https://api.siliconflow.cn",
        "global" => "https://api-global.moonshot.cn",
        other => {
            warn!(platform = %other, "unknown kimi platform, using the default endpoint");
            "https://api.moonshot.cn"
        }
    }
}

fn detect_platform(base_url: &str) -> &'static str {
    if base_url.contains("siliconflow") {
        "siliconflow"
    } else if base_url.contains("moonshot") {
        "moonshot"
    } else {
        "unknown"
    }
}

fn build_request_body(req: &ChatCompletionRequest, model: &str) -> Value {
    serde_json::json!({
        "model": model,
        "messages": req.messages,
        "temperature": req.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        "max_tokens": req.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        "stream": req.stream,
    })
}

// Kimi API response types, private to this module

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f64>,
}
