use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use tradewind_core::config::{ProviderSettings, ProvidersConfig};

use crate::deepseek::DeepSeekService;
use crate::kimi::KimiService;
use crate::service::AiService;

/// Registry of configured AI services, safe to share across handlers.
///
/// Live services are keyed by their configured name ("deepseek", "kimi").
/// The settings map keeps the last settings seen for every name, disabled
/// ones included, so the config endpoint can report them.
pub struct AiManager {
    services: DashMap<String, Arc<dyn AiService>>,
    settings: DashMap<String, ProviderSettings>,
    default_service: String,
}

impl AiManager {
    pub fn from_config(providers: &ProvidersConfig, default_service: &str) -> Self {
        let manager = Self {
            services: DashMap::new(),
            settings: DashMap::new(),
            default_service: default_service.to_string(),
        };
        if let Some(settings) = &providers.deepseek {
            manager.register("deepseek", settings.clone());
        }
        if let Some(settings) = &providers.kimi {
            manager.register("kimi", settings.clone());
        }
        manager
    }

    /// Apply new settings to a service at runtime and rebuild its client.
    /// Configuring a service enables it. Returns false when the settings
    /// cannot produce a usable service; the old instance is gone either way.
    pub fn configure_service(&self, name: &str, mut settings: ProviderSettings) -> bool {
        settings.enabled = true;
        self.services.remove(name);
        self.register(name, settings)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn AiService>> {
        self.services.get(name).map(|entry| entry.value().clone())
    }

    pub fn default_service(&self) -> &str {
        &self.default_service
    }

    /// Names of the services that are actually live.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Per-service status for the config endpoint.
    pub fn service_info(&self) -> BTreeMap<String, Value> {
        let mut info = BTreeMap::new();
        for entry in self.settings.iter() {
            let name = entry.key();
            let settings = entry.value();
            info.insert(
                name.clone(),
                json!({
                    "enabled": settings.enabled,
                    "platform": settings.platform.as_deref().unwrap_or("default"),
                    "model": settings.model.as_deref().unwrap_or(""),
                    "available": self.services.contains_key(name),
                    "platforms": available_platforms(name),
                }),
            );
        }
        info
    }

    fn register(&self, name: &str, settings: ProviderSettings) -> bool {
        let usable = settings.enabled && !settings.api_key.is_empty();
        let built = if usable {
            match build_service(name, &settings) {
                Some(service) => {
                    info!(service = %name, "ai service registered");
                    self.services.insert(name.to_string(), service);
                    true
                }
                None => {
                    warn!(service = %name, "unknown ai service type");
                    false
                }
            }
        } else {
            debug!(service = %name, "ai service not enabled");
            false
        };
        self.settings.insert(name.to_string(), settings);
        built
    }
}

fn build_service(name: &str, settings: &ProviderSettings) -> Option<Arc<dyn AiService>> {
    match name {
        "deepseek" => Some(Arc::new(DeepSeekService::new(settings))),
        "kimi" | "moonshot" | "siliconflow" => Some(Arc::new(KimiService::new(settings))),
        _ => None,
    }
}

/// Platforms a service can be pointed at, with display labels.
fn available_platforms(name: &str) -> Value {
    match name {
        "kimi" => json!({
            "default": "Default platform",
            "siliconflow": "SiliconFlow",
            "moonshot": "Moonshot",
            "cn": "China mainland",
            "global": "Global",
        }),
        _ => json!({ "default": "Default platform" }),
    }
}
