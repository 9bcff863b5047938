use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vigil::config::Config;
use vigil::services::{SignalScanner, TestMonitor, TestStore};
use vigil::sources::BinanceClient;
use vigil::{api, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigil=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Starting Vigil server on {}:{}", config.host, config.port);

    // Shared market-data client and the test store (flat-file system of record)
    let binance = Arc::new(BinanceClient::new(config.binance_api_key.clone()));
    let store = Arc::new(TestStore::open(config.test_store_path.clone()));

    // Market scanner: symbol universe + periodic signal sweeps
    let scanner = SignalScanner::new(binance.clone(), store.clone(), config.clone());
    scanner.start();

    // Price monitor driving the test lifecycle
    let monitor = TestMonitor::new(binance.clone(), store.clone());
    monitor.start(config.test_poll_secs);

    // Create application state
    let state = AppState {
        config: config.clone(),
        binance,
        store,
        scanner,
    };

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = Router::new()
        .merge(api::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Vigil server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
