use serde::{Deserialize, Serialize};

use super::{chapman_richards, validate_curve};
use crate::error::ConfigError;

pub const MAX_HEIGHT_LEVEL: u8 = 8;

/// Raw height units covered by one height level.
const LEVEL_SPAN: u32 = 5;

fn default_asymptote() -> f64 {
    42.0
}

fn default_growth_range() -> f64 {
    1.0
}

fn default_rate() -> f64 {
    0.04
}

fn default_slope() -> f64 {
    0.35
}

/// Species-independent height curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthModel {
    #[serde(default = "default_asymptote")]
    pub asymptote: f64,
    #[serde(default = "default_growth_range")]
    pub growth_range: f64,
    #[serde(default = "default_rate")]
    pub rate: f64,
    #[serde(default = "default_slope")]
    pub slope: f64,
}

impl Default for GrowthModel {
    fn default() -> Self {
        Self {
            asymptote: default_asymptote(),
            growth_range: default_growth_range(),
            rate: default_rate(),
            slope: default_slope(),
        }
    }
}

impl GrowthModel {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.asymptote.is_finite() && self.asymptote >= 0.0) {
            return Err(ConfigError::invalid(
                "growth",
                format!("asymptote must be non-negative, got {}", self.asymptote),
            ));
        }
        validate_curve("growth", self.growth_range, self.rate, self.slope)
    }

    /// Integer raw height reached at `age`.
    pub fn raw_height(&self, age: u32) -> u32 {
        let height = chapman_richards(
            f64::from(age),
            self.asymptote,
            self.growth_range,
            self.rate,
            self.slope,
        );
        height.floor().max(0.0) as u32
    }

    /// Height level in `0..=MAX_HEIGHT_LEVEL` reached at `age`.
    pub fn height_level(&self, age: u32) -> u8 {
        level_for_raw_height(self.raw_height(age))
    }
}

/// Raw height 0 is level 0; levels 1 to 8 each cover five raw units and the
/// top level absorbs everything above.
pub fn level_for_raw_height(raw: u32) -> u8 {
    if raw == 0 {
        return 0;
    }
    let level = (raw - 1) / LEVEL_SPAN + 1;
    level.min(u32::from(MAX_HEIGHT_LEVEL)) as u8
}
