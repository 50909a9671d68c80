use serde::{Deserialize, Serialize};

use super::{chapman_richards, validate_curve};
use crate::error::ConfigError;

fn default_asymptote() -> f64 {
    0.6
}

fn default_growth_range() -> f64 {
    1.0
}

fn default_rate() -> f64 {
    0.01
}

fn default_slope() -> f64 {
    0.5
}

fn default_min_survival() -> f64 {
    0.4
}

/// Age-dependent yearly survival. The death risk follows the same saturating
/// curve as growth; `min_survival` bounds the survival probability from below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortalityModel {
    #[serde(default = "default_asymptote")]
    pub asymptote: f64,
    #[serde(default = "default_growth_range")]
    pub growth_range: f64,
    #[serde(default = "default_rate")]
    pub rate: f64,
    #[serde(default = "default_slope")]
    pub slope: f64,
    #[serde(default = "default_min_survival")]
    pub min_survival: f64,
}

impl Default for MortalityModel {
    fn default() -> Self {
        Self {
            asymptote: default_asymptote(),
            growth_range: default_growth_range(),
            rate: default_rate(),
            slope: default_slope(),
            min_survival: default_min_survival(),
        }
    }
}

impl MortalityModel {
    /// A model under which every draw survives.
    pub fn immortal() -> Self {
        Self {
            min_survival: 1.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.asymptote.is_finite() && self.asymptote >= 0.0) {
            return Err(ConfigError::invalid(
                "mortality",
                format!("asymptote must be non-negative, got {}", self.asymptote),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_survival) {
            return Err(ConfigError::invalid(
                "mortality",
                format!("min_survival must lie in [0, 1], got {}", self.min_survival),
            ));
        }
        validate_curve("mortality", self.growth_range, self.rate, self.slope)
    }

    pub fn survival_probability(&self, age: u32) -> f64 {
        let risk = chapman_richards(
            f64::from(age),
            self.asymptote,
            self.growth_range,
            self.rate,
            self.slope,
        );
        (1.0 - risk).max(self.min_survival).clamp(0.0, 1.0)
    }

    /// `draw` must come from a uniform `[0, 1)` source owned by the caller.
    pub fn is_alive(&self, age: u32, draw: f64) -> bool {
        draw < self.survival_probability(age)
    }
}
