//! Support and Resistance levels detection

use crate::common::math;
use crate::models::indicators::{PivotKind, PivotLevel, PivotLevels};

pub const PIVOT_WINDOW: usize = 50;
pub const MAX_LEVELS: usize = 3;
/// Step used when padding levels toward the window extreme
pub const SYNTHETIC_STEP: f64 = 0.3;

/// Find pivot supports and resistances in the last `PIVOT_WINDOW` bars
///
/// Pivots are 5-point strict extrema of highs (resistance) and lows (support).
/// Only supports below and resistances above the latest close are kept. When
/// fewer than three real levels exist on a side, the rest are placed at
/// `close -/+ (close - extreme) * 0.3 * rank` toward the window's lowest low or
/// highest high. Those padded levels are placeholders, not estimates.
pub fn calculate_support_resistance(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
) -> Option<PivotLevels> {
    let current_price = *closes.last()?;
    let window = PIVOT_WINDOW.min(closes.len()).min(highs.len()).min(lows.len());
    if window == 0 {
        return None;
    }
    let recent_highs = math::tail(highs, window);
    let recent_lows = math::tail(lows, window);

    let mut supports: Vec<PivotLevel> = math::local_troughs(recent_lows)
        .into_iter()
        .map(|i| recent_lows[i])
        .filter(|&price| price < current_price)
        .map(|price| PivotLevel {
            price,
            kind: PivotKind::Support,
        })
        .collect();
    supports.sort_by(|a, b| b.price.total_cmp(&a.price));
    supports.truncate(MAX_LEVELS);

    let mut resistances: Vec<PivotLevel> = math::local_peaks(recent_highs)
        .into_iter()
        .map(|i| recent_highs[i])
        .filter(|&price| price > current_price)
        .map(|price| PivotLevel {
            price,
            kind: PivotKind::Resistance,
        })
        .collect();
    resistances.sort_by(|a, b| a.price.total_cmp(&b.price));
    resistances.truncate(MAX_LEVELS);

    let min_low = recent_lows.iter().copied().fold(f64::INFINITY, f64::min);
    while supports.len() < MAX_LEVELS {
        let rank = (supports.len() + 1) as f64;
        supports.push(PivotLevel {
            price: current_price - (current_price - min_low) * (SYNTHETIC_STEP * rank),
            kind: PivotKind::Support,
        });
    }

    let max_high = recent_highs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    while resistances.len() < MAX_LEVELS {
        let rank = (resistances.len() + 1) as f64;
        resistances.push(PivotLevel {
            price: current_price + (max_high - current_price) * (SYNTHETIC_STEP * rank),
            kind: PivotKind::Resistance,
        });
    }

    Some(PivotLevels {
        supports,
        resistances,
    })
}
