//! Price/RSI divergence detection

use crate::common::math;
use crate::models::indicators::Divergence;

pub const DIVERGENCE_LOOKBACK: usize = 30;

/// Compare the last two extrema of price and RSI inside the lookback window
///
/// Bearish: price makes a higher peak while RSI makes a lower peak.
/// Bullish: price makes a lower trough while RSI makes a higher trough.
/// A side needs at least two extrema in both series, otherwise it stays false.
pub fn calculate_divergence(prices: &[f64], rsi_values: &[f64], lookback: usize) -> Option<Divergence> {
    if lookback == 0 || prices.len() < lookback || rsi_values.len() < lookback {
        return None;
    }

    let recent_prices = math::tail(prices, lookback);
    let recent_rsi = math::tail(rsi_values, lookback);

    let bearish = diverges(
        recent_prices,
        &math::local_peaks(recent_prices),
        recent_rsi,
        &math::local_peaks(recent_rsi),
        |last, prev| last > prev,
    );
    let bullish = diverges(
        recent_prices,
        &math::local_troughs(recent_prices),
        recent_rsi,
        &math::local_troughs(recent_rsi),
        |last, prev| last < prev,
    );

    Some(Divergence { bearish, bullish })
}

pub fn calculate_divergence_default(prices: &[f64], rsi_values: &[f64]) -> Option<Divergence> {
    calculate_divergence(prices, rsi_values, DIVERGENCE_LOOKBACK)
}

/// `price_moves` decides the price leg; RSI must move the opposite way
fn diverges(
    prices: &[f64],
    price_extrema: &[usize],
    rsi: &[f64],
    rsi_extrema: &[usize],
    price_moves: impl Fn(f64, f64) -> bool,
) -> bool {
    match (last_two(prices, price_extrema), last_two(rsi, rsi_extrema)) {
        (Some((price_prev, price_last)), Some((rsi_prev, rsi_last))) => {
            price_moves(price_last, price_prev) && price_moves(rsi_prev, rsi_last)
        }
        _ => false,
    }
}

fn last_two(values: &[f64], extrema: &[usize]) -> Option<(f64, f64)> {
    match extrema {
        [.., prev, last] => Some((values[*prev], values[*last])),
        _ => None,
    }
}
