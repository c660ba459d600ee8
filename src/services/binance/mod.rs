//! Binance public REST access: endpoint pool, resilient client, normalizers

pub mod client;
pub mod endpoints;
pub mod normalize;
pub mod provider;
pub mod rate_limit;
pub mod transport;

pub use client::{MarketClient, RequestOptions};
pub use endpoints::EndpointPool;
pub use normalize::{normalize_klines, normalize_klines_slice, normalize_tickers};
pub use provider::BinanceMarketDataProvider;
pub use rate_limit::RateLimiter;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
