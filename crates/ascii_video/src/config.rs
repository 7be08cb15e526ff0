use serde::Deserialize;

use crate::ascii::gradient::Gradient;
use crate::layout::LayoutConfig;
use crate::Error;

/// Tunable constants of the renderer.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Glyphs from darkest to brightest.
    pub ramp: Gradient,
    /// Cap on rendered frames per second. Unset renders on every tick.
    pub frame_rate: Option<f32>,
    pub layout: LayoutConfig,
}

impl RendererConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(rate) = self.frame_rate {
            if !(rate.is_finite() && rate > 0.0) {
                let message = format!("frame_rate must be positive, got {rate}");
                return Err(Error::InvalidConfig(message));
            }
        }

        self.layout.validate()
    }
}
