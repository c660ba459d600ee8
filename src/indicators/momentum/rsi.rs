//! RSI (Relative Strength Index) indicator

/// Neutral value used to pad the RSI series before enough history exists
pub const RSI_NEUTRAL: f64 = 50.0;

/// Calculate RSI over the whole slice
///
/// Gains and losses are summed across every close-to-close delta in `closes`
/// and each sum is divided by `period`. This is not Wilder's RSI: signal
/// thresholds (30/70) are tuned against this exact formula.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let (gains, losses) = closes
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold((0.0, 0.0), |(gains, losses), change| {
            if change > 0.0 {
                (gains + change, losses)
            } else {
                (gains, losses + change.abs())
            }
        });

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(closes: &[f64]) -> Option<f64> {
    calculate_rsi(closes, 14)
}

/// RSI for every bar, aligned with `closes`
///
/// Each value is the RSI of the `period` closes ending at that bar. Leading
/// bars without a full window are padded with 50.
pub fn calculate_rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period + 1 {
        return vec![RSI_NEUTRAL; closes.len()];
    }

    let mut series = vec![RSI_NEUTRAL; period - 1];
    series.extend(
        closes
            .windows(period)
            .map(|window| calculate_rsi(window, period).unwrap_or(RSI_NEUTRAL)),
    );
    series
}
