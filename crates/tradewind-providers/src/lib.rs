//! AI chat service integrations.
//!
//! One trait ([`AiService`]) fronts every provider the platform talks to:
//! DeepSeek, and the Kimi family (Moonshot and SiliconFlow expose the same
//! API surface, so a single implementation covers both). [`AiManager`] owns
//! the configured set and hands out shared handles to live services.

pub mod deepseek;
pub mod kimi;
pub mod manager;
pub mod service;

pub use deepseek::DeepSeekService;
pub use kimi::KimiService;
pub use manager::AiManager;
pub use service::{
    AiService, ChatCompletionRequest, ChatMessage, ProviderError, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE,
};
