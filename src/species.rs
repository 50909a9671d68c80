//! Species codes and the per-species / per-height lookup tables.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::growth::MAX_HEIGHT_LEVEL;

/// Numeric species code as found in the input records. Display names live
/// with whoever renders the data, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesCode(pub u16);

impl SpeciesCode {
    pub fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Display for SpeciesCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lookup tables consumed by dispersal and admission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesTable {
    /// Dispersal multiplier per species.
    spreading_factors: BTreeMap<SpeciesCode, f64>,
    /// Seeds produced per year, keyed by height level.
    seed_budget: BTreeMap<u8, u32>,
}

impl SpeciesTable {
    pub fn new(
        spreading_factors: BTreeMap<SpeciesCode, f64>,
        seed_budget: BTreeMap<u8, u32>,
    ) -> Result<Self, ConfigError> {
        let table = Self {
            spreading_factors,
            seed_budget,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spreading_factors.is_empty() {
            return Err(ConfigError::invalid(
                "species",
                "at least one species must be configured",
            ));
        }
        for (code, factor) in &self.spreading_factors {
            if code.0 == 0 {
                return Err(ConfigError::invalid("species", "species codes start at 1"));
            }
            if !(factor.is_finite() && *factor > 0.0) {
                return Err(ConfigError::invalid(
                    "species",
                    format!("spreading factor of species {code} must be positive, got {factor}"),
                ));
            }
        }
        for level in 0..=MAX_HEIGHT_LEVEL {
            if !self.seed_budget.contains_key(&level) {
                return Err(ConfigError::MissingSeedBudget(level));
            }
        }
        if let Some(level) = self.seed_budget.keys().find(|level| **level > MAX_HEIGHT_LEVEL) {
            return Err(ConfigError::invalid(
                "seed_budget",
                format!("height level {level} is above {MAX_HEIGHT_LEVEL}"),
            ));
        }
        Ok(())
    }

    pub fn spreading_factor(&self, species: SpeciesCode) -> Result<f64, ConfigError> {
        self.spreading_factors
            .get(&species)
            .copied()
            .ok_or(ConfigError::UnknownSpecies(species))
    }

    pub fn seed_budget(&self, height_level: u8) -> Result<u32, ConfigError> {
        self.seed_budget
            .get(&height_level)
            .copied()
            .ok_or(ConfigError::MissingSeedBudget(height_level))
    }

    pub fn contains(&self, species: SpeciesCode) -> bool {
        self.spreading_factors.contains_key(&species)
    }

    pub fn species(&self) -> impl Iterator<Item = SpeciesCode> + '_ {
        self.spreading_factors.keys().copied()
    }
}

impl Default for SpeciesTable {
    /// Spreading factors of the eleven Vienna street-tree groups and a seed
    /// budget growing with height.
    fn default() -> Self {
        let spreading_factors = [1.5, 1.2, 0.4, 1.1, 0.2, 1.0, 0.9, 1.3, 1.8, 0.7, 0.8]
            .into_iter()
            .enumerate()
            .map(|(index, factor)| (SpeciesCode(index as u16 + 1), factor))
            .collect();
        let seed_budget = [0, 0, 10, 20, 40, 60, 80, 100, 120]
            .into_iter()
            .enumerate()
            .map(|(level, seeds)| (level as u8, seeds))
            .collect();
        Self {
            spreading_factors,
            seed_budget,
        }
    }
}
