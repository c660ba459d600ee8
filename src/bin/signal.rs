//! Klinesignal CLI
//!
//! Fetches candles for one symbol through the resilient client, evaluates the
//! indicator set and prints the resulting signal as JSON.

use dotenvy::dotenv;
use klinesignal::cache::{FileStore, KeyValueStore, MemoryStore, RedisStore};
use klinesignal::config::ClientConfig;
use klinesignal::logging;
use klinesignal::models::market::MarketType;
use klinesignal::services::binance::{BinanceMarketDataProvider, MarketClient};
use klinesignal::signals::engine::{SignalEngine, MIN_CANDLES};
use std::env;
use std::sync::Arc;
use tracing::{info, warn};

async fn build_store() -> Result<Arc<dyn KeyValueStore>, Box<dyn std::error::Error>> {
    let backend = env::var("CACHE_BACKEND").unwrap_or_else(|_| "memory".to_string());
    let store: Arc<dyn KeyValueStore> = match backend.as_str() {
        "file" => {
            let path = env::var("CACHE_PATH").unwrap_or_else(|_| ".klinesignal-cache.json".to_string());
            Arc::new(FileStore::new(path))
        }
        "redis" => Arc::new(RedisStore::new().await?),
        "memory" => Arc::new(MemoryStore::new()),
        other => {
            warn!(backend = other, "unknown CACHE_BACKEND, using memory");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let symbol = env::var("SYMBOL").unwrap_or_else(|_| "BTCUSDT".to_string());
    let market = MarketType::from_label(&env::var("MARKET_TYPE").unwrap_or_default());
    let interval = env::var("INTERVAL").unwrap_or_else(|_| "1h".to_string());
    let limit = env::var("CANDLE_LIMIT")
        .ok()
        .and_then(|l| l.parse().ok())
        .unwrap_or(200)
        .max(MIN_CANDLES);

    let config = ClientConfig::from_env()?;
    let store = build_store().await?;
    let client = Arc::new(MarketClient::new(config, store)?);
    let watcher = client.on_status_change(|status| info!(status = %status, "connection status"));

    info!(symbol = %symbol, market = %market, interval = %interval, limit = limit, "evaluating signal");
    let provider = BinanceMarketDataProvider::new(client.clone(), market);
    let report = SignalEngine::evaluate_from(&provider, &symbol, &interval, limit).await?;

    match report {
        Some(report) => {
            info!(signal = %report.signal, "signal computed");
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        None => warn!(symbol = %symbol, "not enough candles to compute a signal"),
    }

    watcher.abort();
    Ok(())
}
