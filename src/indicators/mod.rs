//! Pure indicator functions over oldest-first price slices.
//!
//! Windowed indicators return `None` when the input is shorter than their
//! lookback; callers treat that as "not available yet", not as an error.
//! Moving averages and MACD fall back to the latest close instead.

pub mod compute;

pub mod momentum;
pub mod structure;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use compute::*;
