//! Stochastic oscillator

use crate::common::math;
use crate::models::indicators::StochasticIndicator;

/// %K over the last `period` bars. %D is reported equal to %K (no smoothing).
pub fn calculate_stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
) -> Option<StochasticIndicator> {
    if period == 0 || closes.len() < period || highs.len() < period || lows.len() < period {
        return None;
    }

    let current_close = *closes.last()?;
    let highest_high = math::tail(highs, period)
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let lowest_low = math::tail(lows, period)
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);

    let range = highest_high - lowest_low;
    let k = if range == 0.0 {
        50.0
    } else {
        ((current_close - lowest_low) / range) * 100.0
    };

    Some(StochasticIndicator { k, d: k })
}

pub fn calculate_stochastic_default(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
) -> Option<StochasticIndicator> {
    calculate_stochastic(highs, lows, closes, 14)
}
