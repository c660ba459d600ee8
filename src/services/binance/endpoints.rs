//! Endpoint pool and URL construction for the exchange hosts

use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::cache::KeyValueStore;
use crate::config::ClientConfig;
use crate::models::market::{EndpointCandidate, MarketType};

/// Path fragments of endpoints that always answer with JSON
const JSON_PATH_PATTERNS: &[&str] = &[
    "/exchangeinfo",
    "/klines",
    "/ticker",
    "/depth",
    "/trades",
    "/aggtrades",
    "/ping",
    "/time",
];

/// Ordered host lists per market type plus the persisted preferred base
pub struct EndpointPool {
    spot: Vec<String>,
    futures: Vec<String>,
    store: Arc<dyn KeyValueStore>,
}

impl EndpointPool {
    pub fn new(spot: Vec<String>, futures: Vec<String>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            spot: spot.iter().map(|base| trim_base(base)).collect(),
            futures: futures.iter().map(|base| trim_base(base)).collect(),
            store,
        }
    }

    pub fn from_config(config: &ClientConfig, store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(config.spot_hosts.clone(), config.futures_hosts.clone(), store)
    }

    pub fn static_hosts(&self, market: MarketType) -> &[String] {
        match market {
            MarketType::Spot => &self.spot,
            MarketType::Futures => &self.futures,
        }
    }

    /// Last recorded direct base. Store failures read as "nothing cached".
    pub async fn cached_base(&self, market: MarketType) -> Option<String> {
        match self.store.get(market.cache_key()).await {
            Ok(value) => value,
            Err(e) => {
                warn!(market = %market, error = %e, "failed to read cached base");
                None
            }
        }
    }

    /// Static host list with the cached base moved to the front when it is a member
    pub async fn candidates(&self, market: MarketType) -> Vec<EndpointCandidate> {
        let hosts = self.static_hosts(market);
        let cached = self
            .cached_base(market)
            .await
            .map(|base| trim_base(&base))
            .filter(|base| hosts.contains(base));

        let ordered: Vec<&String> = match &cached {
            Some(preferred) => std::iter::once(preferred)
                .chain(hosts.iter().filter(|base| *base != preferred))
                .collect(),
            None => hosts.iter().collect(),
        };

        ordered
            .into_iter()
            .map(|base| EndpointCandidate {
                base_url: base.clone(),
                market,
            })
            .collect()
    }

    /// Persist the base that just served a direct request. Write failures are swallowed.
    pub async fn record(&self, market: MarketType, base: &str) {
        match self.store.set(market.cache_key(), base).await {
            Ok(()) => debug!(market = %market, base = base, "recorded preferred base"),
            Err(e) => warn!(market = %market, base = base, error = %e, "failed to persist preferred base"),
        }
    }
}

fn trim_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

pub fn is_absolute_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Ensure a leading `/`; absolute URLs are returned unchanged
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    if is_absolute_url(path) || path.starts_with('/') {
        return path.to_string();
    }
    format!("/{}", path)
}

/// Join base, market prefix and path
///
/// The prefix is skipped when the path already carries an `/api/` or `/fapi/`
/// segment; absolute URLs bypass the base entirely.
pub fn build_url(base: &str, path: &str, prefix: &str) -> String {
    if is_absolute_url(path) {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    let path = normalize_path(path);
    if path.starts_with("/api/") || path.starts_with("/fapi/") {
        format!("{}{}", base, path)
    } else {
        format!("{}{}{}", base, prefix, path)
    }
}

/// Wrap `target` through a relay base ending in its query parameter
pub fn build_proxy_url(relay_base: &str, target: &str, timestamp_ms: i64) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("{}{}&t={}", relay_base, encoded, timestamp_ms)
}

pub fn expects_json(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    JSON_PATH_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}

pub fn is_json_content_type(content_type: &str) -> bool {
    let lower = content_type.to_ascii_lowercase();
    lower.contains("application/json") || lower.contains("text/plain")
}

/// `scheme://host[:port]` of an absolute URL
pub fn origin_of(url: &str) -> Option<String> {
    let origin = Url::parse(url).ok()?.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// Hostname match, plus the full origin when `base` names an explicit port
fn same_host(base: &Url, url: &Url) -> bool {
    let host_matches = match (base.host_str(), url.host_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    };
    host_matches && (base.port().is_none() || base.origin() == url.origin())
}

/// Decide which market an absolute exchange URL belongs to
///
/// Returns `None` for hosts outside the configured lists and exchange domains.
pub fn classify_url(url: &Url, config: &ClientConfig) -> Option<MarketType> {
    let host = url.host_str()?.to_ascii_lowercase();
    let in_list = |bases: &[String]| {
        bases
            .iter()
            .filter_map(|base| Url::parse(base).ok())
            .any(|parsed| same_host(&parsed, url))
    };

    let is_spot_host = in_list(&config.spot_hosts);
    let is_futures_host = in_list(&config.futures_hosts);
    let is_exchange_domain = config
        .exchange_domains
        .iter()
        .any(|domain| host.ends_with(&domain.to_ascii_lowercase()));

    if !(is_spot_host || is_futures_host || is_exchange_domain) {
        return None;
    }
    if is_futures_host || host.starts_with("fapi") {
        return Some(MarketType::Futures);
    }
    if is_spot_host || host.starts_with("api") {
        return Some(MarketType::Spot);
    }

    let path = url.path();
    if path.contains("/fapi/") {
        Some(MarketType::Futures)
    } else if path.contains("/api/") {
        Some(MarketType::Spot)
    } else {
        None
    }
}
