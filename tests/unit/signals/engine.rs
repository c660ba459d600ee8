//! Unit tests for signal engine

use klinesignal::indicators::compute::{compute_indicators, SeriesColumns};
use klinesignal::indicators::structure::calculate_support_resistance;
use klinesignal::models::indicators::Candle;
use klinesignal::models::signal::SignalDirection;
use klinesignal::services::StaticMarketDataProvider;
use klinesignal::signals::engine::{SignalEngine, MIN_CANDLES};
use klinesignal::signals::signal_generator::generate_signal;

/// Closes climb 100..129 over 30 bars, then stay flat at 129
fn ascending_then_flat(count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let close = 100.0 + i.min(29) as f64;
            Candle::new(close, close + 0.5, close - 0.5, close, 1_000.0, i as i64 * 60_000)
        })
        .collect()
}

#[test]
fn test_oversold_uptrend_is_long_at_last_close() {
    let candles = ascending_then_flat(60);
    let columns = SeriesColumns::from_candles(&candles);
    let indicators = compute_indicators(&candles).with_rsi(25.0);
    let pivots = calculate_support_resistance(&columns.highs, &columns.lows, &columns.closes).unwrap();

    assert!(indicators.macd.unwrap().macd > 0.0);

    let price = candles.last().unwrap().close;
    let signal = generate_signal(&indicators, price, &pivots);

    assert_eq!(signal.direction, SignalDirection::Long);
    assert!(signal.score >= 3, "score was {}", signal.score);
    assert_eq!(signal.formatted().entry, "129.00");
}

#[test]
fn test_evaluate_requires_min_candles() {
    assert!(SignalEngine::evaluate(&ascending_then_flat(MIN_CANDLES - 1)).is_none());
}

#[test]
fn test_evaluate_overbought_uptrend() {
    // no losses anywhere -> RSI 100 (-2), MACD +1, ADX amplifies to -2
    let report = SignalEngine::evaluate(&ascending_then_flat(60)).unwrap();

    assert_eq!(report.indicators.rsi, Some(100.0));
    assert_eq!(report.signal.direction, SignalDirection::Short);
    assert_eq!(report.signal.score, 2);
    assert_eq!(report.signal.entry, 129.0);
    assert_eq!(report.pivots.supports.len(), 3);
}

#[tokio::test]
async fn test_evaluate_from_provider() {
    let provider = StaticMarketDataProvider::new("BTCUSDT", ascending_then_flat(120));

    let report = SignalEngine::evaluate_from(&provider, "BTCUSDT", "1h", 60)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(report.signal.entry, 129.0);

    let missing = SignalEngine::evaluate_from(&provider, "ETHUSDT", "1h", 60).await;
    assert!(missing.is_err());
}
