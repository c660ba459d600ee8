//! Binance REST market data provider backed by the resilient client

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::client::{MarketClient, RequestOptions};
use super::normalize::{normalize_klines_slice, normalize_tickers};
use crate::error::{Error, Result};
use crate::models::indicators::{Candle, Ticker};
use crate::models::market::MarketType;
use crate::services::market_data::MarketDataProvider;

/// Upper bound the exchange accepts for `limit` on klines
pub const MAX_KLINES_LIMIT: usize = 1000;

pub struct BinanceMarketDataProvider {
    client: Arc<MarketClient>,
    market: MarketType,
    options: RequestOptions,
}

impl BinanceMarketDataProvider {
    pub fn new(client: Arc<MarketClient>, market: MarketType) -> Self {
        Self {
            client,
            market,
            options: RequestOptions::new().with_accept("application/json"),
        }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn client(&self) -> &Arc<MarketClient> {
        &self.client
    }

    pub fn market(&self) -> MarketType {
        self.market
    }
}

#[async_trait]
impl MarketDataProvider for BinanceMarketDataProvider {
    async fn get_candles(&self, symbol: &str, interval: &str, limit: usize) -> Result<Vec<Candle>> {
        let limit = limit.clamp(1, MAX_KLINES_LIMIT);
        let path = format!(
            "/klines?symbol={}&interval={}&limit={}",
            symbol.to_uppercase(),
            interval,
            limit
        );
        let response = self.client.resolve(self.market, &path, &self.options).await?;
        let candles = normalize_klines_slice(&response.body)?;
        debug!(
            symbol = symbol,
            interval = interval,
            market = %self.market,
            count = candles.len(),
            "fetched candles"
        );
        Ok(candles)
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<f64> {
        Ok(self.get_ticker(symbol).await?.price)
    }

    async fn get_ticker(&self, symbol: &str) -> Result<Ticker> {
        let path = format!("/ticker/price?symbol={}", symbol.to_uppercase());
        let response = self.client.resolve(self.market, &path, &self.options).await?;
        normalize_tickers(&response.json_value()?)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::MalformedData(format!("empty ticker payload for {}", symbol)))
    }
}
