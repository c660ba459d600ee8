//! Integration tests for the resilient market client
//!
//! Mock servers stand in for exchange hosts and relays.

use std::sync::Arc;
use std::time::Duration;

use klinesignal::cache::{KeyValueStore, MemoryStore};
use klinesignal::config::ClientConfig;
use klinesignal::metrics::Metrics;
use klinesignal::models::market::{ConnectionStatus, MarketType};
use klinesignal::services::binance::RequestOptions;
use klinesignal::Error;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::test_utils::{
    client_with, config_for, kline_rows, relay_base, start_spot_hosts, TEST_USER_AGENT,
};

const KLINES: &str = "/klines?symbol=BTCUSDT&interval=1h&limit=5";

async fn mount_klines(server: &MockServer, response: ResponseTemplate, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(response)
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn all_direct_hosts_failing_falls_back_to_relay() {
    let hosts = start_spot_hosts(3).await;
    for host in &hosts {
        mount_klines(host, ResponseTemplate::new(500), 2).await;
    }

    let relay = MockServer::start().await;
    let first_target = format!("{}/api/v3{}", hosts[0].uri(), KLINES);
    Mock::given(method("GET"))
        .and(path("/api/cors-proxy"))
        .and(query_param("url", first_target.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(kline_rows(5)))
        .expect(1)
        .mount(&relay)
        .await;

    let store = Arc::new(MemoryStore::new());
    let cached = hosts[0].uri();
    assert_ok!(store.set(MarketType::Spot.cache_key(), &cached).await);

    let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
    let config = config_for(&hosts.iter().collect::<Vec<_>>(), &[relay_base(&relay.uri())]);
    let client = client_with(config, store.clone()).with_metrics(metrics.clone());

    let response = assert_ok!(client.fetch_spot(KLINES, &RequestOptions::new()).await);

    assert_eq!(response.status, 200);
    assert_eq!(client.status(), ConnectionStatus::Proxy);
    assert_eq!(
        assert_ok!(store.get(MarketType::Spot.cache_key()).await),
        Some(cached),
        "relay success must leave the cached base untouched"
    );
    assert_eq!(store.snapshot().await.len(), 1);
    assert_eq!(metrics.proxy_fallbacks_total.get(), 1);
}

#[tokio::test]
async fn direct_success_records_base_and_connects() {
    let hosts = start_spot_hosts(3).await;
    mount_klines(&hosts[0], ResponseTemplate::new(500), 2).await;
    mount_klines(
        &hosts[1],
        ResponseTemplate::new(200).set_body_json(kline_rows(5)),
        2,
    )
    .await;
    mount_klines(&hosts[2], ResponseTemplate::new(200), 0).await;

    let store = Arc::new(MemoryStore::new());
    let client = client_with(config_for(&hosts.iter().collect::<Vec<_>>(), &[]), store.clone());

    assert_ok!(client.fetch_spot(KLINES, &RequestOptions::new()).await);
    assert_eq!(client.status(), ConnectionStatus::Connected);
    assert_eq!(
        store.get(MarketType::Spot.cache_key()).await.unwrap(),
        Some(hosts[1].uri())
    );

    // the recorded base is tried first next time, so the failing host is skipped
    assert_ok!(client.fetch_spot(KLINES, &RequestOptions::new()).await);
    assert_eq!(
        client.api_base(MarketType::Spot).await,
        format!("{}/api/v3", hosts[1].uri())
    );
}

#[tokio::test]
async fn html_success_on_json_endpoint_is_a_failure() {
    let hosts = start_spot_hosts(2).await;
    mount_klines(
        &hosts[0],
        ResponseTemplate::new(200).set_body_raw("<html>blocked</html>", "text/html"),
        2,
    )
    .await;
    mount_klines(
        &hosts[1],
        ResponseTemplate::new(200).set_body_json(kline_rows(5)),
        1,
    )
    .await;

    let store = Arc::new(MemoryStore::new());
    let client = client_with(config_for(&hosts.iter().collect::<Vec<_>>(), &[]), store.clone());

    let response = assert_ok!(client.fetch_spot(KLINES, &RequestOptions::new()).await);
    assert_eq!(response.json_value().unwrap().as_array().map(Vec::len), Some(5));
    assert_eq!(
        store.get(MarketType::Spot.cache_key()).await.unwrap(),
        Some(hosts[1].uri())
    );
}

#[tokio::test]
async fn error_envelope_moves_on_to_next_host() {
    let hosts = start_spot_hosts(2).await;
    mount_klines(
        &hosts[0],
        ResponseTemplate::new(200).set_body_json(json!({"code": -1003, "msg": "Too many requests"})),
        2,
    )
    .await;
    mount_klines(
        &hosts[1],
        ResponseTemplate::new(200).set_body_json(kline_rows(5)),
        1,
    )
    .await;

    let client = client_with(
        config_for(&hosts.iter().collect::<Vec<_>>(), &[]),
        Arc::new(MemoryStore::new()),
    );

    assert_ok!(client.fetch_spot(KLINES, &RequestOptions::new()).await);
    assert_eq!(client.status(), ConnectionStatus::Connected);
}

#[tokio::test]
async fn exhausted_hosts_report_last_error_and_go_offline() {
    let hosts = start_spot_hosts(3).await;
    for host in &hosts {
        mount_klines(host, ResponseTemplate::new(503), 2).await;
    }

    let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
    let client = client_with(
        config_for(&hosts.iter().collect::<Vec<_>>(), &[]),
        Arc::new(MemoryStore::new()),
    )
    .with_metrics(metrics.clone());

    let err = assert_err!(client.fetch_spot(KLINES, &RequestOptions::new()).await);

    match &err {
        Error::AllHostsExhausted {
            market, attempts, ..
        } => {
            assert_eq!(*market, MarketType::Spot);
            assert_eq!(*attempts, 6);
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }
    assert!(matches!(
        err.last_attempt_error(),
        Error::HttpStatus { status: 503, .. }
    ));
    assert_eq!(client.status(), ConnectionStatus::Offline);
    assert_eq!(metrics.fetch_attempts_total.get(), 6);
    assert_eq!(metrics.exhausted_total.get(), 1);
    assert_eq!(
        metrics
            .fetch_failures_total
            .with_label_values(&["http_status"])
            .get(),
        6
    );
}

#[tokio::test]
async fn slow_host_times_out() {
    let host = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(kline_rows(1))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&host)
        .await;

    let client = client_with(config_for(&[&host], &[]), Arc::new(MemoryStore::new()));
    let opts = RequestOptions::new()
        .with_timeout(Duration::from_millis(50))
        .with_retries(1);

    let err = assert_err!(client.fetch_spot(KLINES, &opts).await);
    assert!(err.is_timeout(), "expected timeout, got {}", err);
}

#[tokio::test]
async fn force_proxy_skips_direct_hosts() {
    let host = MockServer::start().await;
    mount_klines(&host, ResponseTemplate::new(200), 0).await;

    let relay = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cors-proxy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kline_rows(2)))
        .expect(1)
        .mount(&relay)
        .await;

    let store = Arc::new(MemoryStore::new());
    let config = ClientConfig {
        force_proxy: true,
        ..config_for(&[&host], &[relay_base(&relay.uri())])
    };
    let client = client_with(config, store.clone());

    assert_ok!(client.fetch_spot(KLINES, &RequestOptions::new()).await);
    assert_eq!(client.status(), ConnectionStatus::Proxy);
    assert!(store.snapshot().await.is_empty());
}

#[tokio::test]
async fn caller_headers_are_replaced() {
    let host = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/time"))
        .and(header("user-agent", TEST_USER_AGENT))
        .and(header("accept", "application/json"))
        .and(header("x-trace", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"serverTime": 1})))
        .expect(1)
        .mount(&host)
        .await;

    let client = client_with(config_for(&[&host], &[]), Arc::new(MemoryStore::new()));
    let opts = RequestOptions::new()
        .with_accept("application/json")
        .with_header("User-Agent", "Mozilla/5.0")
        .with_header("Cache-Control", "no-cache")
        .with_header("X-Trace", "abc");

    assert_ok!(client.fetch_spot("time", &opts).await);
}

#[tokio::test]
async fn status_changes_are_published() {
    let host = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&host)
        .await;

    let client = client_with(config_for(&[&host], &[]), Arc::new(MemoryStore::new()));
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let watcher = client.on_status_change(move |status| {
        let _ = tx.send(status);
    });
    let mut receiver = client.subscribe_status();
    assert_eq!(*receiver.borrow_and_update(), ConnectionStatus::Offline);

    assert_ok!(client.fetch_spot("/ping", &RequestOptions::new()).await);

    let published = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("status callback fired");
    assert_eq!(published, Some(ConnectionStatus::Connected));
    assert!(receiver.has_changed().unwrap());
    watcher.abort();
}

#[tokio::test]
async fn fetch_by_url_passes_unknown_hosts_through() {
    let other = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
        .expect(1)
        .mount(&other)
        .await;

    let client = client_with(ClientConfig::default(), Arc::new(MemoryStore::new()));
    let url = format!("{}/feed", other.uri());

    let response = assert_ok!(client.fetch_by_url(&url, &RequestOptions::new()).await);
    assert_eq!(response.status, 404);
    assert_eq!(response.text(), "missing");
    assert_eq!(client.status(), ConnectionStatus::Offline);
}

#[tokio::test]
async fn fetch_by_url_other_port_on_pool_host_passes_through() {
    let pool_host = MockServer::start().await;
    mount_klines(&pool_host, ResponseTemplate::new(200), 0).await;

    let other = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(ResponseTemplate::new(404).set_body_string("elsewhere"))
        .expect(1)
        .mount(&other)
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = client_with(config_for(&[&pool_host], &[]), store.clone());
    let url = format!("{}/api/v3{}", other.uri(), KLINES);

    let response = assert_ok!(client.fetch_by_url(&url, &RequestOptions::new()).await);
    assert_eq!(response.status, 404);
    assert_eq!(response.text(), "elsewhere");
    assert!(store.snapshot().await.is_empty());
}

#[tokio::test]
async fn absolute_path_is_a_single_target_and_cached_only_when_pooled() {
    let hosts = start_spot_hosts(2).await;
    for host in &hosts {
        mount_klines(host, ResponseTemplate::new(200), 0).await;
    }
    let outside = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"serverTime": 1})))
        .expect(1)
        .mount(&outside)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"serverTime": 2})))
        .expect(1)
        .mount(&hosts[1])
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = client_with(config_for(&hosts.iter().collect::<Vec<_>>(), &[]), store.clone());

    let outside_url = format!("{}/api/v3/time", outside.uri());
    assert_ok!(client.fetch_spot(&outside_url, &RequestOptions::new()).await);
    assert!(store.snapshot().await.is_empty(), "non-pool origin must not be cached");

    let pooled_url = format!("{}/api/v3/time", hosts[1].uri());
    assert_ok!(client.fetch_spot(&pooled_url, &RequestOptions::new()).await);
    assert_eq!(
        assert_ok!(store.get(MarketType::Spot.cache_key()).await),
        Some(hosts[1].uri())
    );
}

#[tokio::test]
async fn fetch_by_url_resolves_exchange_urls_through_pool() {
    let host = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"serverTime": 1})))
        .expect(1)
        .mount(&host)
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = client_with(config_for(&[&host], &[]), store.clone());
    let url = format!("{}/api/v3/time", host.uri());

    assert_ok!(client.fetch_by_url(&url, &RequestOptions::new()).await);
    assert_eq!(client.status(), ConnectionStatus::Connected);
    assert_eq!(
        store.get(MarketType::Spot.cache_key()).await.unwrap(),
        Some(host.uri())
    );

    assert!(matches!(
        client.fetch_by_url("not a url", &RequestOptions::new()).await,
        Err(Error::InvalidUrl(_))
    ));
}

#[tokio::test]
async fn detect_primes_spot_pool() {
    let hosts = start_spot_hosts(2).await;
    Mock::given(method("GET"))
        .and(path("/api/v3/time"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&hosts[0])
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"serverTime": 1})))
        .expect(1)
        .mount(&hosts[1])
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = client_with(config_for(&hosts.iter().collect::<Vec<_>>(), &[]), store.clone());

    client.detect().await;

    assert_eq!(
        store.get(MarketType::Spot.cache_key()).await.unwrap(),
        Some(hosts[1].uri())
    );
    assert_eq!(store.get(MarketType::Futures.cache_key()).await.unwrap(), None);
}
