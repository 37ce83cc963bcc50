//! Dualcast core: multi-source feature alignment and dual-model forecasting.
//!
//! - Domain types (price bars, reference series, merged forecast rows)
//! - Data providers and point-in-time alignment of coarse reference series
//! - Indicator engine and feature frames with a dense time index
//! - Forecast adapters with an explicit zero fallback, and the merger
//! - Request orchestration, service configuration, sentiment advice

pub mod advice;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod forecast;
pub mod indicators;
pub mod pipeline;

pub use config::ServiceConfig;
pub use error::ForecastError;
pub use pipeline::{ForecastRequest, ForecastResponse, ForecastService};
