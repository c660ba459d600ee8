use std::sync::Arc;

use klinesignal::cache::MemoryStore;
use klinesignal::config::ClientConfig;
use klinesignal::services::binance::{MarketClient, ReqwestTransport};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TEST_USER_AGENT: &str = "klinesignal-test";

/// Positional kline rows with string prices, 60s apart, closes rising by 1
pub fn kline_rows(count: usize) -> Value {
    let rows: Vec<Value> = (0..count)
        .map(|i| {
            let open_time = 1_700_000_000_000i64 + i as i64 * 60_000;
            let close = 100.0 + i as f64;
            json!([
                open_time,
                format!("{:.2}", close - 0.5),
                format!("{:.2}", close + 0.5),
                format!("{:.2}", close - 1.0),
                format!("{:.2}", close),
                "12.50",
                open_time + 59_999,
                "1250.0",
                42,
                "6.0",
                "600.0",
                "0"
            ])
        })
        .collect();
    Value::Array(rows)
}

pub fn relay_base(uri: &str) -> String {
    format!("{}/api/cors-proxy?url=", uri)
}

/// Spot pool made of the given mock servers. Futures points at a closed port.
pub fn config_for(spot: &[&MockServer], relays: &[String]) -> ClientConfig {
    ClientConfig {
        spot_hosts: spot.iter().map(|server| server.uri()).collect(),
        futures_hosts: vec!["http://localhost:9".to_string()],
        relay_bases: relays.to_vec(),
        timeout_ms: 2_000,
        retries: 2,
        retry_delay_ms: 0,
        user_agent: TEST_USER_AGENT.to_string(),
        rate_limit_per_minute: 0,
        ..ClientConfig::default()
    }
}

pub fn client_with(config: ClientConfig, store: Arc<MemoryStore>) -> MarketClient {
    MarketClient::with_transport(config, store, Arc::new(ReqwestTransport::new()))
        .expect("valid client config")
}

pub async fn start_spot_hosts(count: usize) -> Vec<MockServer> {
    let mut servers = Vec::with_capacity(count);
    for _ in 0..count {
        servers.push(MockServer::start().await);
    }
    servers
}
