//! Signal scoring over a computed indicator set.

pub mod engine;
pub mod scoring;
pub mod signal_generator;

pub use engine::*;
pub use scoring::*;
pub use signal_generator::*;
