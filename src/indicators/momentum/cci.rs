//! CCI (Commodity Channel Index) indicator

use crate::common::math;

/// (TP - SMA(TP)) / (0.015 * mean absolute deviation), TP = (high + low + close) / 3
pub fn calculate_cci(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period || highs.len() != closes.len() || lows.len() != closes.len() {
        return None;
    }

    let typical: Vec<f64> = closes
        .iter()
        .zip(highs.iter().zip(lows))
        .map(|(close, (high, low))| (high + low + close) / 3.0)
        .collect();

    let mean = math::sma(&typical, period)?;
    let mean_dev = math::mean_abs_deviation(math::tail(&typical, period), mean);
    if mean_dev == 0.0 {
        return Some(0.0);
    }

    let current = *typical.last()?;
    Some((current - mean) / (0.015 * mean_dev))
}

pub fn calculate_cci_default(highs: &[f64], lows: &[f64], closes: &[f64]) -> Option<f64> {
    calculate_cci(highs, lows, closes, 20)
}
