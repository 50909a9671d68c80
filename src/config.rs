use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geodesy::{BoundingBox, GeoPoint};
use crate::models::{DispersalParams, GrowthModel, MortalityModel, RadialSampling};
use crate::species::{SpeciesCode, SpeciesTable};

fn default_starting_year() -> i32 {
    2023
}

fn default_years() -> u32 {
    20
}

fn default_seeding_radius() -> f64 {
    30.0
}

fn default_living_space() -> f64 {
    4.0
}

fn default_living_space_spread() -> f64 {
    2.0
}

fn default_germination_fraction() -> f64 {
    0.1
}

fn default_cell_size_deg() -> f64 {
    0.001
}

fn default_parallel() -> bool {
    true
}

/// The two corners of the simulated area, in any order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub corner_a: GeoPoint,
    pub corner_b: GeoPoint,
}

impl RegionConfig {
    pub fn bounds(&self) -> Result<BoundingBox, ConfigError> {
        BoundingBox::from_corners(self.corner_a, self.corner_b)
    }
}

/// Where each year's wind comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WindStrategy {
    Fixed { direction_deg: f64, strength: f64 },
    /// Direction uniform in `[0, 360)`, strength uniform over the inclusive
    /// integer range.
    Random { min_strength: u32, max_strength: u32 },
}

impl Default for WindStrategy {
    fn default() -> Self {
        WindStrategy::Random {
            min_strength: 0,
            max_strength: 30,
        }
    }
}

impl WindStrategy {
    fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            WindStrategy::Fixed {
                direction_deg,
                strength,
            } => {
                if !direction_deg.is_finite() {
                    return Err(ConfigError::invalid("wind", "direction must be finite"));
                }
                if !(strength.is_finite() && strength >= 0.0) {
                    return Err(ConfigError::invalid(
                        "wind",
                        format!("strength must be non-negative, got {strength}"),
                    ));
                }
            }
            WindStrategy::Random {
                min_strength,
                max_strength,
            } => {
                if min_strength > max_strength {
                    return Err(ConfigError::invalid(
                        "wind",
                        format!("empty strength range {min_strength}..={max_strength}"),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Parameters of the population engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_starting_year")]
    pub starting_year: i32,
    #[serde(default = "default_years")]
    pub years: u32,
    pub region: RegionConfig,
    /// Seed disk radius before scaling by the spreading factor.
    #[serde(default = "default_seeding_radius")]
    pub base_seeding_radius_m: f64,
    /// Exclusion radius shared by all species.
    #[serde(default = "default_living_space")]
    pub base_living_space_m: f64,
    /// Extra exclusion radius per unit of spreading factor.
    #[serde(default = "default_living_space_spread")]
    pub living_space_spread_m: f64,
    #[serde(default = "default_germination_fraction")]
    pub germination_fraction: f64,
    #[serde(default)]
    pub radial_sampling: RadialSampling,
    #[serde(default)]
    pub wind: WindStrategy,
    #[serde(default)]
    pub species: SpeciesTable,
    #[serde(default)]
    pub growth: GrowthModel,
    #[serde(default)]
    pub mortality: MortalityModel,
    #[serde(default = "default_cell_size_deg")]
    pub grid_cell_deg: f64,
    /// Run the yearly tree sweep on the rayon pool. Results do not depend on
    /// this flag.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl SimulationConfig {
    /// Defaults for everything but the region.
    pub fn for_region(corner_a: GeoPoint, corner_b: GeoPoint) -> Self {
        Self {
            starting_year: default_starting_year(),
            years: default_years(),
            region: RegionConfig { corner_a, corner_b },
            base_seeding_radius_m: default_seeding_radius(),
            base_living_space_m: default_living_space(),
            living_space_spread_m: default_living_space_spread(),
            germination_fraction: default_germination_fraction(),
            radial_sampling: RadialSampling::default(),
            wind: WindStrategy::default(),
            species: SpeciesTable::default(),
            growth: GrowthModel::default(),
            mortality: MortalityModel::default(),
            grid_cell_deg: default_cell_size_deg(),
            parallel: default_parallel(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.region.bounds()?;
        non_negative("base_seeding_radius_m", self.base_seeding_radius_m)?;
        non_negative("base_living_space_m", self.base_living_space_m)?;
        non_negative("living_space_spread_m", self.living_space_spread_m)?;
        if !(0.0..=1.0).contains(&self.germination_fraction) {
            return Err(ConfigError::invalid(
                "germination_fraction",
                format!("must lie in [0, 1], got {}", self.germination_fraction),
            ));
        }
        if !(self.grid_cell_deg.is_finite() && self.grid_cell_deg > 0.0) {
            return Err(ConfigError::invalid(
                "grid_cell_deg",
                format!("must be positive, got {}", self.grid_cell_deg),
            ));
        }
        self.wind.validate()?;
        self.species.validate()?;
        self.growth.validate()?;
        self.mortality.validate()
    }

    pub fn bounds(&self) -> Result<BoundingBox, ConfigError> {
        self.region.bounds()
    }

    pub fn dispersal(&self) -> DispersalParams {
        DispersalParams {
            base_seeding_radius_m: self.base_seeding_radius_m,
            germination_fraction: self.germination_fraction,
            radial_sampling: self.radial_sampling,
        }
    }

    /// Minimum distance between a recruit of `species` and any living tree.
    pub fn exclusion_radius(&self, species: SpeciesCode) -> Result<f64, ConfigError> {
        let factor = self.species.spreading_factor(species)?;
        Ok(self.base_living_space_m + factor * self.living_space_spread_m)
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            name,
            format!("must be non-negative, got {value}"),
        ))
    }
}
