//! Trailing model-input windows over a feature frame.

use super::frame::FeatureFrame;
use tracing::warn;

/// The trailing slice of a frame fed to one model, `time_idx` rebased to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastWindow {
    frame: FeatureFrame,
    requested: usize,
}

impl ForecastWindow {
    pub fn frame(&self) -> &FeatureFrame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Fewer rows were available than requested.
    pub fn is_short(&self) -> bool {
        self.frame.len() < self.requested
    }
}

/// Cuts fixed-length windows. Never rejects: a short frame yields a short
/// window and the model decides whether that is enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBuilder {
    length: usize,
}

impl WindowBuilder {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn build(&self, frame: &FeatureFrame) -> ForecastWindow {
        let window = ForecastWindow {
            frame: frame.tail(self.length),
            requested: self.length,
        };
        if window.is_short() {
            warn!(
                group = frame.group(),
                requested = self.length,
                available = window.len(),
                "short forecast window, using all available rows"
            );
        }
        window
    }
}
