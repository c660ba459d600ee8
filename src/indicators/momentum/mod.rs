//! Momentum oscillators: RSI, MACD, Stochastic, CCI

pub mod cci;
pub mod macd;
pub mod rsi;
pub mod stochastic;

pub use cci::*;
pub use macd::*;
pub use rsi::*;
pub use stochastic::*;
