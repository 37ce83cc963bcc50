//! Domain types shared by every pipeline stage.

pub mod bar;
pub mod forecast;
pub mod series;

pub use bar::{PriceBar, TimeSeriesPoint};
pub use forecast::{ForecastResult, ModelLabel};
pub use series::{Observation, ReferenceSeries};
