//! Seed admission.
//!
//! Seeds compete first-come-first-served in a shuffled order: a seed becomes
//! a tree only if no living tree, recruits of the same year included, stands
//! within its exclusion radius.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;

use super::growth::EmittedSeed;
use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::models::dispersal::SeedCandidate;
use crate::rng::{RngManager, RECRUITMENT_STREAM};
use crate::species::SpeciesCode;
use crate::tree::Tree;
use crate::world::World;

/// A seed with its species lookups already resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingSeed {
    pub seed: SeedCandidate,
    pub spreading_factor: f64,
    pub exclusion_radius_m: f64,
}

/// Resolves the lookups for every seed and shuffles them into processing
/// order. Fails on an unknown species without touching anything.
pub fn prepare(
    seeds: Vec<EmittedSeed>,
    config: &SimulationConfig,
    rng: &RngManager,
) -> Result<Vec<PendingSeed>, ConfigError> {
    let mut lookups: BTreeMap<SpeciesCode, (f64, f64)> = BTreeMap::new();
    let mut pending = Vec::with_capacity(seeds.len());
    for emitted in seeds {
        let species = emitted.seed.species;
        let (spreading_factor, exclusion_radius_m) = match lookups.get(&species) {
            Some(found) => *found,
            None => {
                let found = (
                    config.species.spreading_factor(species)?,
                    config.exclusion_radius(species)?,
                );
                lookups.insert(species, found);
                found
            }
        };
        pending.push(PendingSeed {
            seed: emitted.seed,
            spreading_factor,
            exclusion_radius_m,
        });
    }
    pending.shuffle(&mut rng.stream(RECRUITMENT_STREAM));
    Ok(pending)
}

/// Admits seeds in the given order, inserting each recruit before the next
/// seed is checked. Returns the number of recruits.
pub fn admit(world: &mut World, pending: Vec<PendingSeed>) -> u64 {
    let mut recruits = 0;
    for candidate in pending {
        if world
            .grid()
            .any_within(candidate.seed.position, candidate.exclusion_radius_m)
        {
            continue;
        }
        let id = world.allocate();
        world.insert_tree(Tree::recruit(id, &candidate.seed, candidate.spreading_factor));
        recruits += 1;
    }
    recruits
}
