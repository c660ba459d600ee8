use serde::{Deserialize, Serialize};
use std::fmt;

use super::indicators::DivergenceType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalDirection {
    Long,
    Short,
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalDirection::Long => f.write_str("LONG"),
            SignalDirection::Short => f.write_str("SHORT"),
        }
    }
}

/// Directional trade signal with its price levels. Recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub direction: SignalDirection,
    pub entry: f64,
    pub stop: f64,
    pub take_profit: f64,
    pub score: u32,
    pub has_divergence: bool,
    pub divergence_type: DivergenceType,
}

/// Price levels rendered with two decimals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedLevels {
    pub entry: String,
    pub stop: String,
    pub take_profit: String,
}

impl Signal {
    pub fn formatted(&self) -> FormattedLevels {
        FormattedLevels {
            entry: format!("{:.2}", self.entry),
            stop: format!("{:.2}", self.stop),
            take_profit: format!("{:.2}", self.take_profit),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let levels = self.formatted();
        write!(
            f,
            "{} score={} entry={} stop={} tp={}",
            self.direction, self.score, levels.entry, levels.stop, levels.take_profit
        )
    }
}
