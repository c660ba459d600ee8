//! Environment-driven configuration.
//!
//! Values come from the process environment; binaries call `dotenvy::dotenv()`
//! first so a local `.env` file can provide them.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::models::market::MarketType;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_RETRIES: u32 = 2;
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 1200;
pub const SPOT_PATH_PREFIX: &str = "/api/v3";
pub const FUTURES_PATH_PREFIX: &str = "/fapi/v1";

pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

pub fn get_redis_url() -> String {
    env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

/// Settings of the resilient market data client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URLs (scheme + host) serving the spot API
    pub spot_hosts: Vec<String>,
    pub futures_hosts: Vec<String>,
    pub spot_path_prefix: String,
    pub futures_path_prefix: String,
    /// Relay bases ending in the query parameter, e.g. `https://relay.example/api/cors-proxy?url=`
    pub relay_bases: Vec<String>,
    /// Domains whose hosts `fetch_by_url` treats as exchange hosts
    pub exchange_domains: Vec<String>,
    pub timeout_ms: u64,
    pub retries: u32,
    pub retry_delay_ms: u64,
    pub user_agent: String,
    /// Skip direct hosts and go through the relay chain only
    pub force_proxy: bool,
    /// Attempts allowed per 60s window; 0 disables the limiter
    pub rate_limit_per_minute: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            spot_hosts: [
                "api.binance.com",
                "api1.binance.com",
                "api2.binance.com",
                "api3.binance.com",
                "api4.binance.com",
                "data-api.binance.vision",
            ]
            .iter()
            .map(|host| format!("https://{}", host))
            .collect(),
            futures_hosts: [
                "fapi.binance.com",
                "fapi1.binance.com",
                "fapi2.binance.com",
                "fapi3.binance.com",
                "fapi4.binance.com",
            ]
            .iter()
            .map(|host| format!("https://{}", host))
            .collect(),
            spot_path_prefix: SPOT_PATH_PREFIX.to_string(),
            futures_path_prefix: FUTURES_PATH_PREFIX.to_string(),
            relay_bases: Vec::new(),
            exchange_domains: vec!["binance.com".to_string(), "binance.vision".to_string()],
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retries: DEFAULT_RETRIES,
            retry_delay_ms: 0,
            user_agent: format!("klinesignal/{}", env!("CARGO_PKG_VERSION")),
            force_proxy: false,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by any of the documented environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(hosts) = list_var("SPOT_HOSTS") {
            config.spot_hosts = hosts;
        }
        if let Some(hosts) = list_var("FUTURES_HOSTS") {
            config.futures_hosts = hosts;
        }
        if let Some(bases) = list_var("RELAY_BASES") {
            config.relay_bases = bases;
        }
        if let Some(timeout_ms) = parsed_var("FETCH_TIMEOUT_MS")? {
            config.timeout_ms = timeout_ms;
        }
        if let Some(retries) = parsed_var("FETCH_RETRIES")? {
            config.retries = retries;
        }
        if let Some(delay) = parsed_var("FETCH_RETRY_DELAY_MS")? {
            config.retry_delay_ms = delay;
        }
        if let Ok(user_agent) = env::var("FETCH_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(force_proxy) = parsed_var("FORCE_PROXY")? {
            config.force_proxy = force_proxy;
        }
        if let Some(limit) = parsed_var("RATE_LIMIT_PER_MINUTE")? {
            config.rate_limit_per_minute = limit;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.spot_hosts.is_empty() || self.futures_hosts.is_empty() {
            return Err(Error::Config(
                "spot and futures host lists must not be empty".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(Error::Config("timeout_ms must be > 0".to_string()));
        }
        Ok(())
    }

    pub fn hosts(&self, market: MarketType) -> &[String] {
        match market {
            MarketType::Spot => &self.spot_hosts,
            MarketType::Futures => &self.futures_hosts,
        }
    }

    pub fn path_prefix(&self, market: MarketType) -> &str {
        match market {
            MarketType::Spot => &self.spot_path_prefix,
            MarketType::Futures => &self.futures_path_prefix,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn list_var(name: &str) -> Option<Vec<String>> {
    let raw = env::var(name).ok()?;
    let values: Vec<String> = raw
        .split(',')
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
        .collect();
    (!values.is_empty()).then_some(values)
}

fn parsed_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(None),
    }
}
