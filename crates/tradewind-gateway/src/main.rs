use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

mod app;
mod http;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tradewind_gateway=info,tower_http=debug".into()),
        )
        .init();

    // load config: TRADEWIND_CONFIG env > ./tradewind.toml > defaults
    let config_path = std::env::var("TRADEWIND_CONFIG").ok();
    let config = tradewind_core::TradewindConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        tradewind_core::TradewindConfig::default()
    });

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    let ai =
        tradewind_providers::AiManager::from_config(&config.providers, &config.default_service);
    let exchange = tradewind_exchange::BinanceFutures::new(&config.exchange);
    let scheduler = Arc::new(tradewind_scheduler::TradingScheduler::new(
        config.scheduler.clone(),
    ));

    // spawn the trigger loop in the background; it runs until shutdown
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let scheduler_loop = Arc::clone(&scheduler);
    tokio::spawn(async move { scheduler_loop.run(shutdown_rx).await });

    // jobs registered over HTTP should fire without an extra start call
    scheduler.start()?;

    let state = Arc::new(app::AppState::new(config, ai, exchange, scheduler));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("Tradewind gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    // signal the trigger loop to stop
    let _ = shutdown_tx.send(true);
    Ok(())
}
