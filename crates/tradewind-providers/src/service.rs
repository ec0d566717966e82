use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-request ceiling for provider calls. Trader prompts can take a while
/// on slower models, so this is deliberately generous.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// A single message in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request to an AI chat service.
#[derive(Debug, Clone)]
pub struct ChatCompletionRequest {
    pub messages: Vec<ChatMessage>,
    /// Overrides the service's configured model when set.
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

/// Common interface for AI chat services (DeepSeek, Kimi, etc).
#[async_trait]
pub trait AiService: Send + Sync {
    /// Service name for logging and error messages.
    fn name(&self) -> &str;

    /// Send a chat completion request and return the raw API response.
    async fn chat_completion(&self, req: &ChatCompletionRequest) -> Result<Value, ProviderError>;

    /// Embed a text into a vector. Services without an embedding endpoint
    /// return `NotSupported`.
    async fn embedding(&self, text: &str, model: Option<&str>)
        -> Result<Vec<f64>, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("not supported: {0}")]
    NotSupported(String),
}
