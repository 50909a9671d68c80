//! Individual trees and their yearly state machine.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::geodesy::{BoundingBox, GeoPoint};
use crate::models::dispersal::{self, SeedCandidate, Wind};
use crate::species::SpeciesCode;
use crate::world::TreeId;

/// One row of the initial inventory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
    pub id: u64,
    pub lat: f64,
    pub lon: f64,
    pub species: SpeciesCode,
    /// Height level (0 to 8) at the start of the simulation.
    pub height: u8,
    pub age: u32,
}

impl TreeRecord {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    id: TreeId,
    position: GeoPoint,
    species: SpeciesCode,
    height_level: u8,
    age: u32,
    spreading_factor: f64,
    alive: bool,
}

/// Read-only view handed to consumers of the alive set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeView {
    pub id: TreeId,
    pub position: GeoPoint,
    pub species: SpeciesCode,
    pub age: u32,
    pub height_level: u8,
}

impl Tree {
    pub(crate) fn from_record(record: &TreeRecord, spreading_factor: f64) -> Self {
        Self {
            id: TreeId::new(record.id),
            position: record.position(),
            species: record.species,
            height_level: record.height,
            age: record.age,
            spreading_factor,
            alive: true,
        }
    }

    /// A seedling grown from an admitted seed.
    pub(crate) fn recruit(id: TreeId, seed: &SeedCandidate, spreading_factor: f64) -> Self {
        Self {
            id,
            position: seed.position,
            species: seed.species,
            height_level: 0,
            age: 0,
            spreading_factor,
            alive: true,
        }
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn position(&self) -> GeoPoint {
        self.position
    }

    pub fn species(&self) -> SpeciesCode {
        self.species
    }

    pub fn height_level(&self) -> u8 {
        self.height_level
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn spreading_factor(&self) -> f64 {
        self.spreading_factor
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn view(&self) -> TreeView {
        TreeView {
            id: self.id,
            position: self.position,
            species: self.species,
            age: self.age,
            height_level: self.height_level,
        }
    }

    /// Advances the tree by one year: ages it, regrows it, rolls for
    /// survival and, if it survives, scatters this year's seeds.
    ///
    /// Dead trees stay dead and produce nothing. The only failure is a
    /// missing seed budget, reported before the tree is touched.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        config: &SimulationConfig,
        region: &BoundingBox,
        wind: Wind,
        rng: &mut R,
    ) -> Result<Vec<SeedCandidate>, ConfigError> {
        if !self.alive {
            return Ok(Vec::new());
        }

        let age = self.age.saturating_add(1);
        let height_level = config.growth.height_level(age);
        let draw: f64 = rng.gen();
        if !config.mortality.is_alive(age, draw) {
            self.age = age;
            self.height_level = height_level;
            self.alive = false;
            return Ok(Vec::new());
        }

        let budget = config.species.seed_budget(height_level)?;
        self.age = age;
        self.height_level = height_level;

        let params = config.dispersal();
        let seed_count = dispersal::germinating_seeds(budget, params.germination_fraction);
        Ok(dispersal::disperse(
            self.position,
            self.species,
            wind,
            self.spreading_factor,
            seed_count,
            &params,
            region,
            rng,
        ))
    }
}
