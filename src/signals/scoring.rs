//! Integer score contributions per indicator

use serde::{Deserialize, Serialize};

use crate::models::indicators::Divergence;

/// Thresholds and weights of the integer scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub rsi_oversold: f64,
    pub rsi_weak: f64,
    pub rsi_strong: f64,
    pub rsi_overbought: f64,
    pub adx_trend: f64,
    pub cci_extreme: f64,
    pub divergence_weight: i32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_weak: 40.0,
            rsi_strong: 60.0,
            rsi_overbought: 70.0,
            adx_trend: 25.0,
            cci_extreme: 100.0,
            divergence_weight: 3,
        }
    }
}

pub fn rsi_score(rsi: f64, config: &ScoringConfig) -> i32 {
    if rsi < config.rsi_oversold {
        2
    } else if rsi < config.rsi_weak {
        1
    } else if rsi > config.rsi_overbought {
        -2
    } else if rsi > config.rsi_strong {
        -1
    } else {
        0
    }
}

pub fn macd_score(macd_line: f64) -> i32 {
    if macd_line > 0.0 {
        1
    } else {
        -1
    }
}

/// Strong trend pushes a non-zero score one step further in its own direction
pub fn adx_amplify(score: i32, adx: f64, config: &ScoringConfig) -> i32 {
    if adx > config.adx_trend {
        score + score.signum()
    } else {
        score
    }
}

pub fn cci_score(cci: f64, config: &ScoringConfig) -> i32 {
    if cci < -config.cci_extreme {
        1
    } else if cci > config.cci_extreme {
        -1
    } else {
        0
    }
}

/// Bullish and bearish contributions are applied independently
pub fn divergence_score(divergence: &Divergence, config: &ScoringConfig) -> i32 {
    let mut score = 0;
    if divergence.bullish {
        score += config.divergence_weight;
    }
    if divergence.bearish {
        score -= config.divergence_weight;
    }
    score
}
