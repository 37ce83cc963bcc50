//! Feature frames and the windows cut from them.

pub mod export;
pub mod frame;
pub mod window;

pub use frame::{FeatureColumn, FeatureFrame, FeatureFrameBuilder};
pub use window::{ForecastWindow, WindowBuilder};
