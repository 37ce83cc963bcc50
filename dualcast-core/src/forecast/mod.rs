//! Forecast adapters, the models behind them, and the merger.

pub mod adapter;
pub mod dataset;
pub mod merge;
pub mod model;
pub mod registry;
pub mod remote;
pub mod schema;

pub use adapter::{ForecastAdapter, ForecastOutcome, SchemaSource};
pub use dataset::ModelInput;
pub use merge::merge_forecasts;
pub use model::{ModelError, Prediction, SequenceModel};
pub use registry::ForecastModels;
pub use remote::RemoteModel;
pub use schema::{ModelSchema, ScalerParams, SchemaFingerprint, TargetNormalizer, TargetScale};
