//! Unit tests for support and resistance levels

use klinesignal::indicators::structure::{calculate_support_resistance, MAX_LEVELS};
use klinesignal::models::indicators::PivotKind;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_real_pivots_come_first_then_padding() {
    let closes = vec![100.0; 20];
    let mut highs = vec![101.0; 20];
    let mut lows = vec![99.0; 20];
    lows[5] = 95.0;
    highs[10] = 108.0;

    let levels = calculate_support_resistance(&highs, &lows, &closes).unwrap();

    assert_eq!(levels.supports.len(), MAX_LEVELS);
    assert_eq!(levels.resistances.len(), MAX_LEVELS);
    assert_eq!(levels.nearest_support(), Some(95.0));
    assert_eq!(levels.nearest_resistance(), Some(108.0));
    assert!(approx(levels.supports[1].price, 97.0));
    assert!(approx(levels.supports[2].price, 95.5));
    assert!(approx(levels.resistances[1].price, 104.8));
    assert!(levels.supports.iter().all(|p| p.kind == PivotKind::Support));
    assert!(levels.resistances.iter().all(|p| p.kind == PivotKind::Resistance));
}

#[test]
fn test_monotonic_series_is_fully_synthetic() {
    let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
    let highs: Vec<f64> = closes.iter().map(|c| c + 1.0).collect();
    let lows: Vec<f64> = closes.iter().map(|c| c - 1.0).collect();

    let levels = calculate_support_resistance(&highs, &lows, &closes).unwrap();

    // close 109, lowest low 99, highest high 110
    let supports: Vec<f64> = levels.supports.iter().map(|p| p.price).collect();
    let resistances: Vec<f64> = levels.resistances.iter().map(|p| p.price).collect();
    assert!(approx(supports[0], 106.0));
    assert!(approx(supports[1], 103.0));
    assert!(approx(supports[2], 100.0));
    assert!(approx(resistances[0], 109.3));
    assert!(approx(resistances[2], 109.9));
}

#[test]
fn test_levels_respect_current_price() {
    let closes: Vec<f64> = (0..60)
        .map(|i| 100.0 + (i as f64 * 0.5).sin() * 6.0)
        .collect();
    let highs: Vec<f64> = closes.iter().map(|c| c + 0.8).collect();
    let lows: Vec<f64> = closes.iter().map(|c| c - 0.8).collect();
    let current = *closes.last().unwrap();

    let levels = calculate_support_resistance(&highs, &lows, &closes).unwrap();
    assert!(levels.supports.iter().all(|p| p.price <= current));
    assert!(levels.resistances.iter().all(|p| p.price >= current));
}

#[test]
fn test_empty_series() {
    assert!(calculate_support_resistance(&[], &[], &[]).is_none());
}
