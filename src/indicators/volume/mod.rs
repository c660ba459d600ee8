//! Volume indicators

pub mod obv;

pub use obv::*;
