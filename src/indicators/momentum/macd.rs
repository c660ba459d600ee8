//! MACD (Moving Average Convergence Divergence) indicator

use crate::common::math;
use crate::models::indicators::MacdIndicator;

/// Calculate MACD
///
/// MACD = EMA(12) - EMA(26). The signal line and histogram are reported as 0;
/// they are not derived from an EMA of the MACD line.
pub fn calculate_macd(closes: &[f64], fast_period: usize, slow_period: usize) -> Option<MacdIndicator> {
    let fast_ema = math::ema(closes, fast_period)?;
    let slow_ema = math::ema(closes, slow_period)?;

    Some(MacdIndicator {
        macd: fast_ema - slow_ema,
        signal: 0.0,
        histogram: 0.0,
    })
}

/// Calculate MACD with default periods (12, 26)
pub fn calculate_macd_default(closes: &[f64]) -> Option<MacdIndicator> {
    calculate_macd(closes, 12, 26)
}
