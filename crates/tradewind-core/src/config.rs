use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Top-level config (tradewind.toml + TRADEWIND_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradewindConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    /// Which AI service answers requests that don't name one.
    #[serde(default = "default_service")]
    pub default_service: String,
}

impl Default for TradewindConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            scheduler: SchedulerConfig::default(),
            providers: ProvidersConfig::default(),
            exchange: ExchangeConfig::default(),
            default_service: default_service(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// Settings for the recurring trade-analysis scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Base URL of the gateway the scheduler posts analysis requests back to.
    #[serde(default = "default_scheduler_base_url")]
    pub base_url: String,
    /// Per-call timeout for the shared HTTP client, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            base_url: default_scheduler_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Per-service AI provider settings.
///
/// `platform` selects a well-known endpoint for services that expose several
/// (Kimi: default / siliconflow / moonshot / cn / global). An explicit
/// `base_url` always wins over the platform lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub api_key: String,
    pub base_url: Option<String>,
    pub platform: Option<String>,
    pub model: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    pub deepseek: Option<ProviderSettings>,
    pub kimi: Option<ProviderSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    #[serde(default = "default_binance_futures_base_url")]
    pub binance_futures_base_url: String,
    pub binance_api_key: Option<String>,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            binance_futures_base_url: default_binance_futures_base_url(),
            binance_api_key: None,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_scheduler_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_binance_futures_base_url() -> String {
    "https://fapi.binance.com".to_string()
}
fn default_service() -> String {
    "kimi".to_string()
}

impl TradewindConfig {
    /// Load config from a TOML file with TRADEWIND_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ./tradewind.toml (working directory)
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path.unwrap_or("tradewind.toml");

        let config: TradewindConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("TRADEWIND_").split("_"))
            .extract()
            .map_err(|e| crate::error::CoreError::Config(e.to_string()))?;

        Ok(config)
    }
}
