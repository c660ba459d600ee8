//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod market;
pub mod signal;

pub use indicators::{
    BollingerBandsIndicator, Candle, Divergence, DivergenceType, IndicatorSet, MacdIndicator,
    PivotKind, PivotLevel, PivotLevels, StochasticIndicator, Ticker,
};
pub use market::{ConnectionStatus, EndpointCandidate, MarketType};
pub use signal::{FormattedLevels, Signal, SignalDirection};
