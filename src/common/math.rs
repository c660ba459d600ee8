//! Slice math used by the indicators. Inputs are oldest-first.

/// Mean of the last `period` values.
///
/// With fewer than `period` values this falls back to the most recent value.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    let last = *values.last()?;
    if period == 0 || values.len() < period {
        return Some(last);
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// EMA seeded with the first element (not an SMA), k = 2 / (period + 1).
///
/// With fewer than `period` values this falls back to the most recent value.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    let last = *values.last()?;
    if values.len() < period {
        return Some(last);
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = values[0];
    for value in &values[1..] {
        ema = ema_from_previous(*value, ema, k);
    }
    Some(ema)
}

pub fn ema_from_previous(value: f64, previous: f64, k: f64) -> f64 {
    value * k + previous * (1.0 - k)
}

pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    (high - low)
        .max((high - prev_close).abs())
        .max((low - prev_close).abs())
}

/// Population standard deviation of `window` around `mean`
pub fn population_std_dev(window: &[f64], mean: f64) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / window.len() as f64;
    variance.sqrt()
}

pub fn mean_abs_deviation(window: &[f64], mean: f64) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    window.iter().map(|v| (v - mean).abs()).sum::<f64>() / window.len() as f64
}

/// Last `n` elements (or all of them)
pub fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

/// Indices strictly greater than both neighbours on each side
pub fn local_peaks(values: &[f64]) -> Vec<usize> {
    five_point_extrema(values, |center, other| center > other)
}

/// Indices strictly less than both neighbours on each side
pub fn local_troughs(values: &[f64]) -> Vec<usize> {
    five_point_extrema(values, |center, other| center < other)
}

fn five_point_extrema(values: &[f64], beats: impl Fn(f64, f64) -> bool) -> Vec<usize> {
    if values.len() < 5 {
        return Vec::new();
    }
    (2..values.len() - 2)
        .filter(|&i| {
            let center = values[i];
            beats(center, values[i - 2])
                && beats(center, values[i - 1])
                && beats(center, values[i + 1])
                && beats(center, values[i + 2])
        })
        .collect()
}
