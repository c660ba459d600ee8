//! Full indicator set for a candle series

use crate::indicators::momentum::{
    calculate_cci_default, calculate_macd_default, calculate_rsi_default, calculate_rsi_series,
    calculate_stochastic_default,
};
use crate::indicators::structure::calculate_divergence_default;
use crate::indicators::trend::{calculate_adx_default, calculate_ema, calculate_sma};
use crate::indicators::volatility::{calculate_atr_default, calculate_bollinger_bands_default};
use crate::indicators::volume::calculate_obv;
use crate::models::indicators::{Candle, IndicatorSet};

/// Column view of a candle series
#[derive(Debug, Clone, Default)]
pub struct SeriesColumns {
    pub closes: Vec<f64>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl SeriesColumns {
    pub fn from_candles(candles: &[Candle]) -> Self {
        let mut columns = Self {
            closes: Vec::with_capacity(candles.len()),
            highs: Vec::with_capacity(candles.len()),
            lows: Vec::with_capacity(candles.len()),
            volumes: Vec::with_capacity(candles.len()),
        };
        for candle in candles {
            columns.closes.push(candle.close);
            columns.highs.push(candle.high);
            columns.lows.push(candle.low);
            columns.volumes.push(candle.volume);
        }
        columns
    }
}

/// Compute every indicator from scratch. No state is carried between calls.
pub fn compute_indicators(candles: &[Candle]) -> IndicatorSet {
    let SeriesColumns {
        closes,
        highs,
        lows,
        volumes,
    } = SeriesColumns::from_candles(candles);

    let rsi_series = calculate_rsi_series(&closes, 14);
    let divergence = calculate_divergence_default(&closes, &rsi_series);

    IndicatorSet {
        sma20: calculate_sma(&closes, 20),
        sma50: calculate_sma(&closes, 50),
        ema12: calculate_ema(&closes, 12),
        ema26: calculate_ema(&closes, 26),
        rsi: calculate_rsi_default(&closes),
        macd: calculate_macd_default(&closes),
        bollinger: calculate_bollinger_bands_default(&closes),
        stochastic: calculate_stochastic_default(&highs, &lows, &closes),
        atr: calculate_atr_default(&highs, &lows, &closes),
        adx: calculate_adx_default(&highs, &lows, &closes),
        obv: calculate_obv(&closes, &volumes),
        cci: calculate_cci_default(&highs, &lows, &closes),
        rsi_series,
        divergence,
    }
}
