//! SMA (Simple Moving Average) indicator

use crate::common::math;

/// Mean of the last `period` closes, or the latest close when history is shorter
pub fn calculate_sma(closes: &[f64], period: usize) -> Option<f64> {
    math::sma(closes, period)
}
