//! Unit tests for the full indicator set

use klinesignal::indicators::compute_indicators;
use klinesignal::models::indicators::Candle;

fn candles(count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.3).sin() * 4.0 + i as f64 * 0.2;
            Candle::new(close - 0.2, close + 0.6, close - 0.6, close, 1_000.0 + i as f64, i as i64 * 60_000)
        })
        .collect()
}

#[test]
fn test_full_history_populates_every_indicator() {
    let set = compute_indicators(&candles(60));

    assert!(set.sma20.is_some());
    assert!(set.sma50.is_some());
    assert!(set.ema12.is_some());
    assert!(set.ema26.is_some());
    assert!(set.rsi.is_some());
    assert!(set.macd.is_some());
    assert!(set.bollinger.is_some());
    assert!(set.stochastic.is_some());
    assert!(set.atr.is_some());
    assert!(set.adx.is_some());
    assert!(set.cci.is_some());
    assert!(set.divergence.is_some());
    assert_eq!(set.rsi_series.len(), 60);
}

#[test]
fn test_short_history_leaves_windowed_indicators_empty() {
    let series = candles(10);
    let set = compute_indicators(&series);

    assert_eq!(set.sma20, Some(series[9].close));
    assert!(set.rsi.is_none());
    assert!(set.bollinger.is_none());
    assert!(set.atr.is_none());
    assert!(set.adx.is_none());
    assert!(set.cci.is_none());
    assert!(set.divergence.is_none());
}

#[test]
fn test_recomputation_is_deterministic() {
    let series = candles(80);
    let first = compute_indicators(&series);
    let second = compute_indicators(&series);
    assert_eq!(first.rsi, second.rsi);
    assert_eq!(first.macd, second.macd);
    assert_eq!(first.obv, second.obv);
}
