//! Relay HTTP server using Axum
//!
//! `GET /api/cors-proxy?url=<target>` fetches an allow-listed exchange URL and
//! returns its status and body verbatim with permissive CORS and a shared-cache
//! directive.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};
use url::Url;

use crate::config::ClientConfig;
use crate::metrics::Metrics;
use crate::services::binance::transport::{HttpRequest, HttpTransport, ReqwestTransport};

pub const RELAY_CACHE_CONTROL: &str = "s-maxage=30, stale-while-revalidate=60";
pub const DEFAULT_CONTENT_TYPE: &str = "application/json; charset=utf-8";

#[derive(Clone)]
pub struct RelayState {
    pub transport: Arc<dyn HttpTransport>,
    /// Exact hostnames the relay may fetch
    pub allowed_hosts: Arc<HashSet<String>>,
    /// Domain suffixes the relay may fetch
    pub allowed_domains: Arc<Vec<String>>,
    pub timeout: Duration,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
}

impl RelayState {
    /// Allow-list built from the configured exchange hosts and domains
    pub fn from_config(
        config: &ClientConfig,
        transport: Arc<dyn HttpTransport>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let allowed_hosts = config
            .spot_hosts
            .iter()
            .chain(config.futures_hosts.iter())
            .filter_map(|base| Url::parse(base).ok())
            .filter_map(|parsed| parsed.host_str().map(str::to_ascii_lowercase))
            .collect();

        Self {
            transport,
            allowed_hosts: Arc::new(allowed_hosts),
            allowed_domains: Arc::new(
                config
                    .exchange_domains
                    .iter()
                    .map(|domain| domain.to_ascii_lowercase())
                    .collect(),
            ),
            timeout: config.timeout(),
            metrics,
            start_time: Arc::new(Instant::now()),
        }
    }

    pub fn is_allowed(&self, target: &Url) -> bool {
        let Some(host) = target.host_str().map(str::to_ascii_lowercase) else {
            return false;
        };
        self.allowed_hosts.contains(&host)
            || self
                .allowed_domains
                .iter()
                .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
    }
}

#[derive(Debug, Deserialize)]
pub struct RelayQuery {
    url: Option<String>,
}

pub async fn health_check(State(state): State<RelayState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "service": "klinesignal-relay"
    }))
}

pub async fn metrics_handler(State(state): State<RelayState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn relay_handler(
    State(state): State<RelayState>,
    Query(query): Query<RelayQuery>,
) -> Response {
    let Some(target) = query.url.filter(|url| !url.trim().is_empty()) else {
        return reject(&state, StatusCode::BAD_REQUEST, "missing url parameter");
    };
    let parsed = match Url::parse(&target) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => parsed,
        _ => return reject(&state, StatusCode::BAD_REQUEST, "invalid url parameter"),
    };
    if !state.is_allowed(&parsed) {
        warn!(target = %target, "relay target host not allowed");
        return reject(&state, StatusCode::BAD_REQUEST, "target host not allowed");
    }

    let request = HttpRequest {
        url: parsed.to_string(),
        headers: vec![
            (
                "User-Agent".to_string(),
                format!("klinesignal-relay/{}", env!("CARGO_PKG_VERSION")),
            ),
            ("Accept".to_string(), "*/*".to_string()),
        ],
    };

    let upstream = match tokio::time::timeout(state.timeout, state.transport.get(&request)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            warn!(target = %target, error = %e, "relay upstream failed");
            return reject(&state, StatusCode::BAD_GATEWAY, "upstream request failed");
        }
        Err(_) => {
            warn!(target = %target, timeout_ms = state.timeout.as_millis() as u64, "relay upstream timed out");
            return reject(&state, StatusCode::BAD_GATEWAY, "upstream request timed out");
        }
    };

    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    state
        .metrics
        .relay_requests_total
        .with_label_values(&[status.as_str()])
        .inc();

    let content_type = upstream
        .content_type
        .clone()
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

    (
        status,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, RELAY_CACHE_CONTROL.to_string()),
        ],
        upstream.body,
    )
        .into_response()
}

fn reject(state: &RelayState, status: StatusCode, message: &str) -> Response {
    state
        .metrics
        .relay_requests_total
        .with_label_values(&[status.as_str()])
        .inc();
    (status, Json(json!({ "error": message }))).into_response()
}

pub fn create_router(state: RelayState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/cors-proxy", get(relay_handler))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_relay_server(
    port: u16,
    config: &ClientConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);
    let state = RelayState::from_config(config, Arc::new(ReqwestTransport::new()), metrics);
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "relay server listening on port {}", port);
    info!("Relay endpoint available at http://0.0.0.0:{}/api/cors-proxy?url=", port);
    axum::serve(listener, app).await?;

    Ok(())
}
