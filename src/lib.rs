//! Resilient exchange market data access and deterministic signal scoring.

pub mod cache;
pub mod common;
pub mod config;
pub mod core;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;

pub use error::{Error, Result};
