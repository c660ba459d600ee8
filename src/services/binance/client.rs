//! Resilient fetch executor
//!
//! `MarketClient` resolves a market-relative path against the endpoint pool,
//! retrying each candidate URL in order. When every direct host fails the same
//! URLs are replayed through the configured relay bases. Connection status is
//! published on a `watch` channel.

use backon::{ConstantBuilder, Retryable};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use super::endpoints::{
    build_proxy_url, build_url, classify_url, expects_json, is_absolute_url, is_json_content_type,
    origin_of, EndpointPool,
};
use super::rate_limit::RateLimiter;
use super::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::cache::KeyValueStore;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::metrics::Metrics;
use crate::models::market::{ConnectionStatus, MarketType};

/// Caller headers the client always replaces with its own
const STRIPPED_HEADERS: &[&str] = &["cache-control", "pragma", "expires", "user-agent", "accept"];

const DETECT_TIMEOUT: Duration = Duration::from_secs(4);

/// Per-request overrides of the client configuration
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub accept: Option<String>,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    pub retries: Option<u32>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }
}

/// One URL to try. `base` is the pool member a success is recorded under.
#[derive(Debug, Clone)]
struct Target {
    url: String,
    check_url: String,
    base: Option<String>,
    relayed: bool,
}

pub struct MarketClient {
    config: ClientConfig,
    pool: EndpointPool,
    transport: Arc<dyn HttpTransport>,
    limiter: Option<RateLimiter>,
    metrics: Option<Arc<Metrics>>,
    status: watch::Sender<ConnectionStatus>,
}

impl MarketClient {
    pub fn new(config: ClientConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        Self::with_transport(config, store, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(
        config: ClientConfig,
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        config.validate()?;

        let pool = EndpointPool::from_config(&config, store);
        let limiter = RateLimiter::per_minute(config.rate_limit_per_minute);
        let (status, _) = watch::channel(ConnectionStatus::default());

        Ok(Self {
            config,
            pool,
            transport,
            limiter,
            metrics: None,
            status,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        metrics.set_status(*self.status.borrow());
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn pool(&self) -> &EndpointPool {
        &self.pool
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    /// Run `callback` on every status transition until the client is dropped
    pub fn on_status_change<F>(&self, mut callback: F) -> JoinHandle<()>
    where
        F: FnMut(ConnectionStatus) + Send + 'static,
    {
        let mut receiver = self.status.subscribe();
        tokio::spawn(async move {
            while receiver.changed().await.is_ok() {
                let status = *receiver.borrow_and_update();
                callback(status);
            }
        })
    }

    pub async fn fetch_spot(&self, path: &str, opts: &RequestOptions) -> Result<HttpResponse> {
        self.resolve(MarketType::Spot, path, opts).await
    }

    pub async fn fetch_futures(&self, path: &str, opts: &RequestOptions) -> Result<HttpResponse> {
        self.resolve(MarketType::Futures, path, opts).await
    }

    /// Fetch an absolute URL
    ///
    /// Exchange URLs are re-resolved through the pool of their market type.
    /// Anything else gets a single plain GET and its response is returned
    /// whatever the status.
    pub async fn fetch_by_url(&self, url: &str, opts: &RequestOptions) -> Result<HttpResponse> {
        let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;

        if let Some(market) = classify_url(&parsed, &self.config) {
            let mut path = parsed.path().to_string();
            if let Some(query) = parsed.query() {
                path.push('?');
                path.push_str(query);
            }
            return self.resolve(market, &path, opts).await;
        }

        debug!(url = url, "passing non-exchange url straight through");
        let timeout = opts.timeout.unwrap_or_else(|| self.config.timeout());
        let request = HttpRequest {
            url: url.to_string(),
            headers: self.request_headers(opts),
        };
        self.send(&request, timeout).await
    }

    /// Resolve `path` for `market` across direct hosts, then relays
    pub async fn resolve(
        &self,
        market: MarketType,
        path: &str,
        opts: &RequestOptions,
    ) -> Result<HttpResponse> {
        let timeout = opts.timeout.unwrap_or_else(|| self.config.timeout());
        let retries = opts.retries.unwrap_or(self.config.retries).max(1);
        let headers = self.request_headers(opts);
        let prefix = self.config.path_prefix(market);

        let direct = self.direct_targets(market, path, prefix).await;

        let mut attempts = 0usize;
        let mut last_error = None;

        if self.config.force_proxy {
            debug!(market = %market, path = path, "force_proxy set, skipping direct hosts");
        } else {
            match self
                .try_targets(&direct, &headers, timeout, retries, &mut attempts)
                .await
            {
                Ok((response, target)) => {
                    if let Some(base) = &target.base {
                        self.pool.record(market, base).await;
                    }
                    self.set_status(ConnectionStatus::Connected);
                    return Ok(response);
                }
                Err(e) => last_error = Some(e),
            }
        }

        let proxied = self.proxy_targets(&direct);
        if !proxied.is_empty() {
            info!(
                market = %market,
                path = path,
                relays = self.config.relay_bases.len(),
                "direct hosts exhausted, switching to relay chain"
            );
            if let Some(metrics) = &self.metrics {
                metrics.proxy_fallbacks_total.inc();
            }
            match self
                .try_targets(&proxied, &headers, timeout, retries, &mut attempts)
                .await
            {
                Ok((response, _)) => {
                    self.set_status(ConnectionStatus::Proxy);
                    return Ok(response);
                }
                Err(e) => last_error = Some(e),
            }
        }

        self.set_status(ConnectionStatus::Offline);
        if let Some(metrics) = &self.metrics {
            metrics.exhausted_total.inc();
        }
        let last = last_error
            .unwrap_or_else(|| Error::Config(format!("no hosts available for {}", market)));
        warn!(
            market = %market,
            path = path,
            attempts = attempts,
            error = %last,
            "all hosts exhausted"
        );
        Err(Error::AllHostsExhausted {
            market,
            path: path.to_string(),
            attempts,
            last: Box::new(last),
        })
    }

    /// Warm-up probe of both markets; primes the pool and the status
    pub async fn detect(&self) -> ConnectionStatus {
        let opts = RequestOptions::new()
            .with_retries(1)
            .with_timeout(DETECT_TIMEOUT);
        let (spot, futures) = tokio::join!(
            self.fetch_spot("/time", &opts),
            self.fetch_futures("/time", &opts)
        );

        for (market, result) in [(MarketType::Spot, spot), (MarketType::Futures, futures)] {
            if let Err(e) = result {
                debug!(market = %market, error = %e, "detect probe failed");
            }
        }
        self.status()
    }

    /// Preferred direct base joined with the market prefix
    pub async fn api_base(&self, market: MarketType) -> String {
        let base = self
            .pool
            .candidates(market)
            .await
            .into_iter()
            .next()
            .map(|candidate| candidate.base_url)
            .unwrap_or_default();
        format!("{}{}", base, self.config.path_prefix(market))
    }

    async fn try_targets<'a>(
        &self,
        targets: &'a [Target],
        headers: &[(String, String)],
        timeout: Duration,
        retries: u32,
        attempts: &mut usize,
    ) -> Result<(HttpResponse, &'a Target)> {
        let mut last_error = None;

        for target in targets {
            let policy = ConstantBuilder::default()
                .with_delay(self.config.retry_delay())
                .with_max_times(retries.saturating_sub(1) as usize);

            let result = (|| {
                *attempts += 1;
                self.attempt(target, headers, timeout)
            })
            .retry(policy)
            .sleep(tokio::time::sleep)
            .notify(|e: &Error, delay: Duration| {
                debug!(
                    url = %target.url,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "retrying same url"
                );
            })
            .await;

            match result {
                Ok(response) => return Ok((response, target)),
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Config("empty target list".to_string())))
    }

    async fn attempt(
        &self,
        target: &Target,
        headers: &[(String, String)],
        timeout: Duration,
    ) -> Result<HttpResponse> {
        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }
        if let Some(metrics) = &self.metrics {
            metrics.fetch_attempts_total.inc();
        }

        let request = HttpRequest {
            url: target.url.clone(),
            headers: headers.to_vec(),
        };
        debug!(url = %target.url, relayed = target.relayed, "fetch attempt");

        let result = self
            .send(&request, timeout)
            .await
            .and_then(|response| validate_response(response, &target.url, &target.check_url));

        if let Err(e) = &result {
            warn!(url = %target.url, kind = e.kind(), error = %e, "fetch attempt failed");
            if let Some(metrics) = &self.metrics {
                metrics.record_failure(e.kind());
            }
        }
        result
    }

    /// Single GET bounded by `timeout`; the in-flight call is dropped on expiry
    async fn send(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse> {
        match tokio::time::timeout(timeout, self.transport.get(request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                url: request.url.clone(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    /// Pool candidates joined with `path`
    ///
    /// An absolute `path` yields a single target, recorded only when its origin
    /// is a member of the pool.
    async fn direct_targets(&self, market: MarketType, path: &str, prefix: &str) -> Vec<Target> {
        if is_absolute_url(path) {
            let base = origin_of(path).filter(|origin| {
                self.pool
                    .static_hosts(market)
                    .iter()
                    .any(|host| host.eq_ignore_ascii_case(origin))
            });
            return vec![Target {
                url: path.to_string(),
                check_url: path.to_string(),
                base,
                relayed: false,
            }];
        }

        self.pool
            .candidates(market)
            .await
            .into_iter()
            .map(|candidate| {
                let url = build_url(&candidate.base_url, path, prefix);
                let base = origin_of(&url).unwrap_or_else(|| candidate.base_url.clone());
                Target {
                    check_url: url.clone(),
                    url,
                    base: Some(base),
                    relayed: false,
                }
            })
            .collect()
    }

    /// Every direct URL wrapped through every relay, relays outermost
    fn proxy_targets(&self, direct: &[Target]) -> Vec<Target> {
        let timestamp = Utc::now().timestamp_millis();
        self.config
            .relay_bases
            .iter()
            .flat_map(|relay| {
                direct.iter().map(move |target| Target {
                    url: build_proxy_url(relay, &target.url, timestamp),
                    check_url: target.url.clone(),
                    base: None,
                    relayed: true,
                })
            })
            .collect()
    }

    fn request_headers(&self, opts: &RequestOptions) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = opts
            .headers
            .iter()
            .filter(|(name, _)| !STRIPPED_HEADERS.contains(&name.to_ascii_lowercase().as_str()))
            .cloned()
            .collect();
        headers.push(("User-Agent".to_string(), self.config.user_agent.clone()));
        headers.push((
            "Accept".to_string(),
            opts.accept.clone().unwrap_or_else(|| "*/*".to_string()),
        ));
        headers
    }

    fn set_status(&self, next: ConnectionStatus) {
        let changed = self.status.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if let Some(metrics) = &self.metrics {
            metrics.set_status(next);
        }
        if changed {
            info!(status = %next, "connection status changed");
        }
    }
}

/// Status check plus, on JSON endpoints, content type and payload checks
fn validate_response(response: HttpResponse, url: &str, check_url: &str) -> Result<HttpResponse> {
    if !response.is_success() {
        return Err(Error::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }
    if !expects_json(check_url) {
        return Ok(response);
    }

    let content_type = response.content_type.as_deref().unwrap_or_default();
    if !is_json_content_type(content_type) {
        return Err(Error::NonJsonResponse {
            url: url.to_string(),
            detail: format!("unexpected content type {:?}", content_type),
        });
    }

    let payload: Value = serde_json::from_slice(&response.body).map_err(|e| Error::NonJsonResponse {
        url: url.to_string(),
        detail: e.to_string(),
    })?;
    if let Some(object) = payload.as_object() {
        if let (Some(code), Some(msg)) = (object.get("code"), object.get("msg")) {
            return Err(Error::ErrorPayload {
                url: url.to_string(),
                code: code.to_string(),
                msg: msg.as_str().map(str::to_string).unwrap_or_else(|| msg.to_string()),
            });
        }
    }
    Ok(response)
}
