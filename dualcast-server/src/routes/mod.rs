//! Route handlers.
//!
//! - [`health`]: liveness probe
//! - [`forecast`]: dual-model forecast
//! - [`analyze`]: news sentiment and advice

pub mod analyze;
pub mod forecast;
pub mod health;
