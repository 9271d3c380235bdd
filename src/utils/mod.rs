// src/utils/mod.rs
//! Shared numeric helpers

pub mod fingerprint;
pub mod stats;

pub use fingerprint::SessionFingerprint;
pub use stats::{linear_trend, TemporalStats};
