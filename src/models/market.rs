use serde::{Deserialize, Serialize};
use std::fmt;

/// Which endpoint pool and path prefix a request is routed through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Spot,
    Futures,
}

impl MarketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::Spot => "spot",
            MarketType::Futures => "futures",
        }
    }

    /// Key under which the preferred direct base is persisted
    pub fn cache_key(&self) -> &'static str {
        match self {
            MarketType::Spot => "binance_spot_base",
            MarketType::Futures => "binance_futures_base",
        }
    }

    /// Lenient parse used for user-supplied labels; anything unknown is spot
    pub fn from_label(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "futures" | "future" | "perp" | "perpetual" => MarketType::Futures,
            _ => MarketType::Spot,
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the last resolution reached the exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Proxy,
    Offline,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Proxy => "proxy",
            ConnectionStatus::Offline => "offline",
        }
    }

    pub fn gauge_value(&self) -> i64 {
        match self {
            ConnectionStatus::Offline => 0,
            ConnectionStatus::Proxy => 1,
            ConnectionStatus::Connected => 2,
        }
    }
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        ConnectionStatus::Offline
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCandidate {
    pub base_url: String,
    pub market: MarketType,
}
