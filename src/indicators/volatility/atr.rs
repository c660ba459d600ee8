//! ATR (Average True Range) indicator

use crate::common::math;

/// Mean of the last `period` true ranges
///
/// Needs `period + 1` bars since every true range looks at the previous close.
pub fn calculate_atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 || highs.len() != closes.len() || lows.len() != closes.len() {
        return None;
    }

    let tr_values: Vec<f64> = (1..closes.len())
        .map(|i| math::true_range(highs[i], lows[i], closes[i - 1]))
        .collect();

    let window = math::tail(&tr_values, period);
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Calculate ATR with default period (14)
pub fn calculate_atr_default(highs: &[f64], lows: &[f64], closes: &[f64]) -> Option<f64> {
    calculate_atr(highs, lows, closes, 14)
}
