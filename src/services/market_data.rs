//! Market data provider interface consumed by the signal engine

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::indicators::{Candle, Ticker};

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Historical candles for a symbol, oldest first
    async fn get_candles(&self, symbol: &str, interval: &str, limit: usize) -> Result<Vec<Candle>>;

    /// Get the latest price for a symbol
    async fn get_latest_price(&self, symbol: &str) -> Result<f64>;

    async fn get_ticker(&self, symbol: &str) -> Result<Ticker>;
}

/// Serves a fixed candle series, for offline runs and tests
pub struct StaticMarketDataProvider {
    symbol: String,
    candles: Vec<Candle>,
}

impl StaticMarketDataProvider {
    pub fn new(symbol: impl Into<String>, mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|candle| candle.open_time);
        Self {
            symbol: symbol.into(),
            candles,
        }
    }

    fn ensure_symbol(&self, symbol: &str) -> Result<()> {
        if symbol.eq_ignore_ascii_case(&self.symbol) {
            Ok(())
        } else {
            Err(Error::MalformedData(format!("no data for symbol {}", symbol)))
        }
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketDataProvider {
    async fn get_candles(&self, symbol: &str, _interval: &str, limit: usize) -> Result<Vec<Candle>> {
        self.ensure_symbol(symbol)?;
        let start = self.candles.len().saturating_sub(limit);
        Ok(self.candles[start..].to_vec())
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<f64> {
        self.ensure_symbol(symbol)?;
        self.candles
            .last()
            .map(|candle| candle.close)
            .ok_or_else(|| Error::MalformedData(format!("no candles for {}", symbol)))
    }

    async fn get_ticker(&self, symbol: &str) -> Result<Ticker> {
        let price = self.get_latest_price(symbol).await?;
        Ok(Ticker {
            symbol: self.symbol.clone(),
            price,
            price_change_percent: None,
            volume: self.candles.last().map(|candle| candle.volume),
        })
    }
}
