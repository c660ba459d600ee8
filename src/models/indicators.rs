use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV interval. Series are ordered ascending by `open_time` (ms).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64, open_time: i64) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn open_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.open_time)
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_change_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdIndicator {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBandsIndicator {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticIndicator {
    pub k: f64,
    pub d: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DivergenceType {
    Bullish,
    Bearish,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divergence {
    pub bearish: bool,
    pub bullish: bool,
}

impl Divergence {
    pub fn has_divergence(&self) -> bool {
        self.bearish || self.bullish
    }

    /// Bearish wins when both sides fire
    pub fn kind(&self) -> DivergenceType {
        if self.bearish {
            DivergenceType::Bearish
        } else if self.bullish {
            DivergenceType::Bullish
        } else {
            DivergenceType::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PivotKind {
    Support,
    Resistance,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotLevel {
    pub price: f64,
    pub kind: PivotKind,
}

/// Up to three supports (closest below first) and three resistances (closest above first)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    pub supports: Vec<PivotLevel>,
    pub resistances: Vec<PivotLevel>,
}

impl PivotLevels {
    pub fn nearest_support(&self) -> Option<f64> {
        self.supports.first().map(|p| p.price)
    }

    pub fn nearest_resistance(&self) -> Option<f64> {
        self.resistances.first().map(|p| p.price)
    }
}

/// Every indicator computed from one candle series. `None` means "not enough history yet".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub ema12: Option<f64>,
    pub ema26: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<MacdIndicator>,
    pub bollinger: Option<BollingerBandsIndicator>,
    pub stochastic: Option<StochasticIndicator>,
    pub atr: Option<f64>,
    pub adx: Option<f64>,
    pub obv: f64,
    pub cci: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub rsi_series: Vec<f64>,
    pub divergence: Option<Divergence>,
}

impl IndicatorSet {
    pub fn with_rsi(mut self, rsi: f64) -> Self {
        self.rsi = Some(rsi);
        self
    }

    pub fn with_macd(mut self, macd: MacdIndicator) -> Self {
        self.macd = Some(macd);
        self
    }

    pub fn with_adx(mut self, adx: f64) -> Self {
        self.adx = Some(adx);
        self
    }

    pub fn with_cci(mut self, cci: f64) -> Self {
        self.cci = Some(cci);
        self
    }

    pub fn with_divergence(mut self, divergence: Divergence) -> Self {
        self.divergence = Some(divergence);
        self
    }
}
