use tracing::debug;

use crate::models::indicators::{DivergenceType, IndicatorSet, PivotLevels};
use crate::models::signal::{Signal, SignalDirection};
use crate::signals::scoring::{self, ScoringConfig};

/// Fallback stop/target multipliers when no pivot exists on a side
#[derive(Debug, Clone)]
pub struct LevelFallbacks {
    pub long_stop: f64,
    pub long_target: f64,
    pub short_stop: f64,
    pub short_target: f64,
}

impl Default for LevelFallbacks {
    fn default() -> Self {
        Self {
            long_stop: 0.97,
            long_target: 1.05,
            short_stop: 1.03,
            short_target: 0.95,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignalGenerator {
    scoring: ScoringConfig,
    fallbacks: LevelFallbacks,
}

impl SignalGenerator {
    pub fn new(scoring: ScoringConfig, fallbacks: LevelFallbacks) -> Self {
        Self { scoring, fallbacks }
    }

    /// Sum of all indicator contributions. Missing indicators contribute nothing.
    pub fn total_score(&self, indicators: &IndicatorSet) -> i32 {
        let mut score = 0;

        if let Some(rsi) = indicators.rsi {
            score += scoring::rsi_score(rsi, &self.scoring);
        }
        if let Some(macd) = &indicators.macd {
            score += scoring::macd_score(macd.macd);
        }
        if let Some(adx) = indicators.adx {
            score = scoring::adx_amplify(score, adx, &self.scoring);
        }
        if let Some(cci) = indicators.cci {
            score += scoring::cci_score(cci, &self.scoring);
        }
        if let Some(divergence) = &indicators.divergence {
            score += scoring::divergence_score(divergence, &self.scoring);
        }

        score
    }

    /// Score the indicator set and place entry, stop and target around `price`
    ///
    /// A total of exactly 0 resolves to SHORT.
    pub fn generate_signal(&self, indicators: &IndicatorSet, price: f64, pivots: &PivotLevels) -> Signal {
        let total = self.total_score(indicators);
        let direction = if total > 0 {
            SignalDirection::Long
        } else {
            SignalDirection::Short
        };

        let support = pivots.nearest_support();
        let resistance = pivots.nearest_resistance();
        let (stop, take_profit) = match direction {
            SignalDirection::Long => (
                support.unwrap_or(price * self.fallbacks.long_stop),
                resistance.unwrap_or(price * self.fallbacks.long_target),
            ),
            SignalDirection::Short => (
                resistance.unwrap_or(price * self.fallbacks.short_stop),
                support.unwrap_or(price * self.fallbacks.short_target),
            ),
        };

        let (has_divergence, divergence_type) = indicators
            .divergence
            .map(|d| (d.has_divergence(), d.kind()))
            .unwrap_or((false, DivergenceType::None));

        debug!(total, %direction, price, stop, take_profit, "signal scored");

        Signal {
            direction,
            entry: price,
            stop,
            take_profit,
            score: total.unsigned_abs(),
            has_divergence,
            divergence_type,
        }
    }
}

/// Score with the default thresholds
pub fn generate_signal(indicators: &IndicatorSet, price: f64, pivots: &PivotLevels) -> Signal {
    SignalGenerator::default().generate_signal(indicators, price, pivots)
}
