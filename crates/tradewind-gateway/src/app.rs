use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use tradewind_core::TradewindConfig;
use tradewind_exchange::BinanceFutures;
use tradewind_providers::AiManager;
use tradewind_scheduler::TradingScheduler;

/// Central shared state, passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: TradewindConfig,
    pub ai: AiManager,
    pub exchange: BinanceFutures,
    pub scheduler: Arc<TradingScheduler>,
}

impl AppState {
    pub fn new(
        config: TradewindConfig,
        ai: AiManager,
        exchange: BinanceFutures,
        scheduler: Arc<TradingScheduler>,
    ) -> Self {
        Self {
            config,
            ai,
            exchange,
            scheduler,
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/health/ready", get(crate::http::health::ready_handler))
        .route("/api/ai/services", get(crate::http::ai::list_services))
        .route(
            "/api/ai/config",
            get(crate::http::ai::get_service_config).post(crate::http::ai::update_service_config),
        )
        .route("/api/ai/chat", post(crate::http::ai::chat_completion))
        .route("/api/ai/chat/trader", post(crate::http::ai::chat_trader))
        .route("/api/ai/embedding", post(crate::http::ai::embedding))
        .route(
            "/api/exchange/binance/futures/klines",
            get(crate::http::exchange::get_klines),
        )
        .route(
            "/api/exchange/binance/futures/symbols",
            get(crate::http::exchange::get_symbols),
        )
        .route(
            "/api/scheduler/jobs",
            get(crate::http::scheduler::list_jobs).post(crate::http::scheduler::add_job),
        )
        .route(
            "/api/scheduler/jobs/{job_id}",
            delete(crate::http::scheduler::remove_job),
        )
        .route(
            "/api/scheduler/jobs/{job_id}/interval",
            put(crate::http::scheduler::update_interval),
        )
        .route("/api/scheduler/start", post(crate::http::scheduler::start))
        .route("/api/scheduler/stop", post(crate::http::scheduler::stop))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    async fn spawn_app() -> String {
        let config = TradewindConfig::default();
        let ai = AiManager::from_config(&config.providers, &config.default_service);
        let exchange = BinanceFutures::new(&config.exchange);
        let scheduler = Arc::new(TradingScheduler::new(config.scheduler.clone()));
        let state = Arc::new(AppState::new(config, ai, exchange, scheduler));
        let router = build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn health_reports_scheduler_state() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();

        let body: Value = client
            .get(format!("{base}/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["jobs"], 0);
        assert_eq!(body["scheduler_running"], false);

        let ready: Value = client
            .get(format!("{base}/health/ready"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(ready["status"], "ready");
    }

    #[tokio::test]
    async fn scheduler_jobs_crud_over_http() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("{base}/api/scheduler/jobs"))
            .json(&json!({
                "job_id": "btc-5m",
                "symbol": "BTCUSDT",
                "interval_value": 5,
                "interval_unit": "m",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["job"]["symbol"], "BTCUSDT");
        assert_eq!(body["job"]["interval_value"], 5);
        assert_eq!(body["job"]["interval_unit"], "minutes");
        assert!(body["job"]["next_fire_time"].is_string());

        let listed: Value = client
            .get(format!("{base}/api/scheduler/jobs"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(listed["jobs"]["btc-5m"]["interval_value"], 5);

        let resp = client
            .put(format!("{base}/api/scheduler/jobs/btc-5m/interval"))
            .json(&json!({ "interval_value": 10 }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["job"]["interval_value"], 10);

        let resp = client
            .put(format!("{base}/api/scheduler/jobs/missing/interval"))
            .json(&json!({ "interval_value": 10 }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);

        let resp = client
            .post(format!("{base}/api/scheduler/jobs"))
            .json(&json!({
                "job_id": "bad",
                "symbol": "BTCUSDT",
                "interval_value": 0,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        let removed: Value = client
            .delete(format!("{base}/api/scheduler/jobs/btc-5m"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(removed["removed"], true);

        let removed: Value = client
            .delete(format!("{base}/api/scheduler/jobs/btc-5m"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(removed["removed"], false);
    }

    #[tokio::test]
    async fn scheduler_lifecycle_over_http() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();

        let started: Value = client
            .post(format!("{base}/api/scheduler/start"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(started["status"], "started");

        let health: Value = client
            .get(format!("{base}/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["scheduler_running"], true);

        let stopped: Value = client
            .post(format!("{base}/api/scheduler/stop"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(stopped["status"], "stopped");
    }

    #[tokio::test]
    async fn ai_routes_reject_unconfigured_services() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();

        let services: Value = client
            .get(format!("{base}/api/ai/services"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(services["count"], 0);
        assert_eq!(services["default"], "kimi");

        let resp = client
            .post(format!("{base}/api/ai/chat"))
            .json(&json!({
                "service": "kimi",
                "messages": [{"role": "user", "content": "hello"}],
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn kline_queries_are_validated_before_any_upstream_call() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();

        let resp = client
            .get(format!(
                "{base}/api/exchange/binance/futures/klines?symbol=BTCUSDT&limit=0"
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        let resp = client
            .get(format!(
                "{base}/api/exchange/binance/futures/klines?symbol=BTCUSDT&interval=7m"
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn symbols_lists_the_supported_pairs() {
        let base = spawn_app().await;

        let body: Value = reqwest::get(format!("{base}/api/exchange/binance/futures/symbols"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["count"], 10);
        assert!(body["symbols"]
            .as_array()
            .unwrap()
            .iter()
            .any(|s| s == "BTCUSDT"));
    }
}
