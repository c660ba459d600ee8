pub mod binance;
pub mod market_data;

pub use market_data::{MarketDataProvider, StaticMarketDataProvider};
