//! Candles-to-signal pipeline.

use serde::Serialize;

use crate::error::Result;
use crate::indicators::compute::{compute_indicators, SeriesColumns};
use crate::indicators::structure::calculate_support_resistance;
use crate::models::indicators::{Candle, IndicatorSet, PivotLevels};
use crate::models::signal::Signal;
use crate::services::market_data::MarketDataProvider;
use crate::signals::signal_generator::SignalGenerator;

pub const MIN_CANDLES: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct SignalReport {
    pub signal: Signal,
    pub indicators: IndicatorSet,
    pub pivots: PivotLevels,
}

pub struct SignalEngine;

impl SignalEngine {
    /// Evaluate the latest candle with the default scorer.
    /// Returns `None` with fewer than `MIN_CANDLES` candles.
    pub fn evaluate(candles: &[Candle]) -> Option<SignalReport> {
        Self::evaluate_with(candles, &SignalGenerator::default())
    }

    pub fn evaluate_with(candles: &[Candle], generator: &SignalGenerator) -> Option<SignalReport> {
        if candles.len() < MIN_CANDLES {
            return None;
        }

        let price = candles.last()?.close;
        let indicators = compute_indicators(candles);
        let columns = SeriesColumns::from_candles(candles);
        let pivots = calculate_support_resistance(&columns.highs, &columns.lows, &columns.closes)?;
        let signal = generator.generate_signal(&indicators, price, &pivots);

        Some(SignalReport {
            signal,
            indicators,
            pivots,
        })
    }

    /// Fetch `limit` candles from `provider` and evaluate them
    pub async fn evaluate_from(
        provider: &dyn MarketDataProvider,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Option<SignalReport>> {
        let candles = provider.get_candles(symbol, interval, limit).await?;
        Ok(Self::evaluate(&candles))
    }
}
