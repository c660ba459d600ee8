//! Core application primitives

pub mod http;

pub use http::*;
