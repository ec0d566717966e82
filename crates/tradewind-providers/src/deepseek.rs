use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use tradewind_core::config::ProviderSettings;

use crate::service::{
    AiService, ChatCompletionRequest, ProviderError, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
    REQUEST_TIMEOUT,
};

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
const DEFAULT_MODEL: &str = "deepseek-chat";

pub struct DeepSeekService {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl DeepSeekService {
    pub fn new(settings: &ProviderSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: settings.api_key.clone(),
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: settings
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl AiService for DeepSeekService {
    fn name(&self) -> &str {
        "deepseek"
    }

    async fn chat_completion(&self, req: &ChatCompletionRequest) -> Result<Value, ProviderError> {
        let model = req.model.clone().unwrap_or_else(|| self.model.clone());
        let body = build_request_body(req, &model);
        let url = format!("{}/v1/chat/completions", self.base_url);

        debug!(model = %model, "sending chat completion to DeepSeek");

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
            warn!(status, body = %message, "DeepSeek API error");
            return Err(ProviderError::Api { status, message });
        }

        resp.json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }

    async fn embedding(
        &self,
        _text: &str,
        _model: Option<&str>,
    ) -> Result<Vec<f64>, ProviderError> {
        Err(ProviderError::NotSupported(
            "deepseek has no embedding endpoint".to_string(),
        ))
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

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Json;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::Router;
    use std::sync::{Arc, Mutex};

    fn settings(base_url: String) -> ProviderSettings {
        ProviderSettings {
            api_key: "sk-test".to_string(),
            base_url: Some(base_url),
            platform: None,
            model: None,
            enabled: true,
        }
    }

    #[tokio::test]
    async fn chat_completion_fills_in_the_defaults() {
        let seen: Arc<Mutex<Vec<(Option<String>, Value)>>> = Arc::new(Mutex::new(Vec::new()));
        let captured = seen.clone();
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    captured.lock().unwrap().push((auth, body));
                    Json(serde_json::json!({"choices": [{"message": {"content": "ok"}}]}))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let service = DeepSeekService::new(&settings(format!("http://{addr}")));
        let req = ChatCompletionRequest {
            messages: vec![crate::service::ChatMessage::user("analyse BTCUSDT")],
            model: None,
            temperature: None,
            max_tokens: None,
            stream: false,
        };
        let resp = service.chat_completion(&req).await.unwrap();
        assert_eq!(resp["choices"][0]["message"]["content"], "ok");

        let seen = seen.lock().unwrap();
        let (auth, body) = &seen[0];
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
        assert_eq!(body["model"], "deepseek-chat");
        assert_eq!(body["temperature"], 0.3);
        assert_eq!(body["max_tokens"], 2048);
        assert_eq!(body["stream"], false);
    }

    #[tokio::test]
    async fn embedding_is_not_supported() {
        let service = DeepSeekService::new(&settings("http://127.0.0.1:9".to_string()));
        let err = service.embedding("text", None).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotSupported(_)));
    }
}
