//! Market structure: support/resistance pivots and RSI divergence

pub mod divergence;
pub mod support_resistance;

pub use divergence::*;
pub use support_resistance::*;
