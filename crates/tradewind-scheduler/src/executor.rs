use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::info;

use tradewind_core::AnalysisTarget;

use crate::error::{Result, SchedulerError};

/// The single HTTP client shared by every firing.
///
/// `None` while the scheduler is stopped; firings fail fast instead of
/// opening ad-hoc connections. Cloning a `reqwest::Client` is cheap, so each
/// firing takes its own clone out of the slot and keeps it for the duration
/// of the call. A concurrent stop clears the slot for future firings but
/// never breaks a call that already started.
pub type SharedConnection = Arc<RwLock<Option<reqwest::Client>>>;

/// Turns a firing into one POST against the trader endpoint.
///
/// No automatic retry: a failed call is reported and the cycle ends, the
/// job's own recurrence is the retry mechanism.
pub struct AnalysisExecutor {
    base_url: String,
    connection: SharedConnection,
}

impl AnalysisExecutor {
    pub fn new(base_url: String, connection: SharedConnection) -> Self {
        Self {
            base_url,
            connection,
        }
    }

    /// Build the payload from the job's target and POST it downstream.
    ///
    /// Success (HTTP 200) logs the response body at INFO and returns `Ok`.
    /// Every other outcome maps to an error for the caller to report: the
    /// schedule itself is never touched from here.
    pub async fn execute(&self, job_id: &str, target: &AnalysisTarget) -> Result<()> {
        let client = {
            let slot = self.connection.read().unwrap();
            slot.clone()
        };
        let Some(client) = client else {
            return Err(SchedulerError::ConnectionUnavailable);
        };

        let payload = serde_json::to_value(target)?;
        let url = format!("{}/api/ai/chat/trader", self.base_url);

        info!(job_id = %job_id, symbol = %target.symbol, "executing trade analysis");

        let resp = client.post(&url).json(&payload).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SchedulerError::Downstream {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = resp.json().await?;
        info!(job_id = %job_id, symbol = %target.symbol, response = %body, "trade analysis completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use std::sync::Mutex;
    use tradewind_core::FuturesSymbol;

    fn connection_with_client() -> SharedConnection {
        Arc::new(RwLock::new(Some(reqwest::Client::new())))
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn missing_connection_fails_fast() {
        let connection: SharedConnection = Arc::new(RwLock::new(None));
        let executor = AnalysisExecutor::new("http://127.0.0.1:9".to_string(), connection);
        let target = AnalysisTarget::new(FuturesSymbol::BTCUSDT);

        let err = executor.execute("job-1", &target).await.unwrap_err();
        assert!(matches!(err, SchedulerError::ConnectionUnavailable));
    }

    #[tokio::test]
    async fn successful_call_posts_the_target_payload() {
        let bodies: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
        let seen = bodies.clone();
        let router = Router::new().route(
            "/api/ai/chat/trader",
            post(move |Json(body): Json<Value>| {
                let seen = seen.clone();
                async move {
                    seen.lock().unwrap().push(body);
                    Json(serde_json::json!({"analysis": "hold"}))
                }
            }),
        );
        let base_url = serve(router).await;

        let executor = AnalysisExecutor::new(base_url, connection_with_client());
        let mut target = AnalysisTarget::new(FuturesSymbol::BTCUSDT);
        target
            .extra
            .insert("note".to_string(), serde_json::json!("swing"));

        executor.execute("job-1", &target).await.unwrap();

        let bodies = bodies.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["symbol"], "BTCUSDT");
        assert_eq!(bodies[0]["kline_interval"], "1h");
        assert_eq!(bodies[0]["note"], "swing");
    }

    #[tokio::test]
    async fn non_success_status_maps_to_downstream_error() {
        let router = Router::new().route(
            "/api/ai/chat/trader",
            post(|| async {
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "model unavailable",
                )
            }),
        );
        let base_url = serve(router).await;

        let executor = AnalysisExecutor::new(base_url, connection_with_client());
        let target = AnalysisTarget::new(FuturesSymbol::ETHUSDT);

        let err = executor.execute("job-2", &target).await.unwrap_err();
        match err {
            SchedulerError::Downstream { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "model unavailable");
            }
            other => panic!("expected Downstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_errors_map_to_request_error() {
        // Nothing listens on this port.
        let connection = connection_with_client();
        let executor = AnalysisExecutor::new("http://127.0.0.1:1".to_string(), connection);
        let target = AnalysisTarget::new(FuturesSymbol::SOLUSDT);

        let err = executor.execute("job-3", &target).await.unwrap_err();
        assert!(matches!(err, SchedulerError::Request(_)));
    }
}
