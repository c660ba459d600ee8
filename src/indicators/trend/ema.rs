//! EMA (Exponential Moving Average) indicator

use crate::common::math;

/// Calculate EMA for a specific period
///
/// Seeded with the first close rather than an SMA of the first `period`
/// closes, so warm-up differs from the textbook EMA.
pub fn calculate_ema(closes: &[f64], period: usize) -> Option<f64> {
    math::ema(closes, period)
}

