//! ADX (Average Directional Index) indicator

use crate::indicators::volatility::calculate_atr;

/// Calculate the simplified ADX
///
/// +DM and -DM are summed over the whole series (no Wilder smoothing) and
/// normalised by `period` and the windowed ATR:
/// DI = DM / period / ATR * 100, DX = |DI+ - DI-| / (DI+ + DI-) * 100.
/// The 25 trend threshold used by the scorer is tuned against this formula.
pub fn calculate_adx(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Option<f64> {
    let atr = calculate_atr(highs, lows, closes, period)?;
    if atr == 0.0 {
        return None;
    }

    let mut dm_plus = 0.0;
    let mut dm_minus = 0.0;
    for i in 1..highs.len().min(lows.len()) {
        let up_move = highs[i] - highs[i - 1];
        let down_move = lows[i - 1] - lows[i];

        if up_move > down_move && up_move > 0.0 {
            dm_plus += up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            dm_minus += down_move;
        }
    }

    let di_plus = (dm_plus / period as f64 / atr) * 100.0;
    let di_minus = (dm_minus / period as f64 / atr) * 100.0;
    let di_sum = di_plus + di_minus;
    if di_sum == 0.0 {
        return Some(0.0);
    }

    Some((di_plus - di_minus).abs() / di_sum * 100.0)
}

/// Calculate ADX with default period (14)
pub fn calculate_adx_default(highs: &[f64], lows: &[f64], closes: &[f64]) -> Option<f64> {
    calculate_adx(highs, lows, closes, 14)
}
