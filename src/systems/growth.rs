//! Yearly sweep over the alive trees.
//!
//! Each tree is advanced on a private copy with its own random stream, so
//! the sweep neither mutates the world nor depends on visiting order. The
//! caller commits the result once every fallible step of the year is done.

use rayon::prelude::*;

use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::geodesy::BoundingBox;
use crate::models::dispersal::{SeedCandidate, Wind};
use crate::rng::{RngManager, TREE_STREAM};
use crate::tree::Tree;
use crate::world::{TreeId, World};

/// A seed tagged with where it came from, for a canonical processing order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmittedSeed {
    pub parent: TreeId,
    pub index: usize,
    pub seed: SeedCandidate,
}

#[derive(Debug, Default)]
pub struct SweepOutcome {
    /// New state of every tree that was alive at the start of the year.
    pub updated: Vec<Tree>,
    /// Seeds in (parent, index) order.
    pub seeds: Vec<EmittedSeed>,
}

impl SweepOutcome {
    pub fn deaths(&self) -> usize {
        self.updated.iter().filter(|tree| !tree.is_alive()).count()
    }
}

fn advance(
    tree: &Tree,
    config: &SimulationConfig,
    region: &BoundingBox,
    wind: Wind,
    rng: &RngManager,
) -> Result<(Tree, Vec<SeedCandidate>), ConfigError> {
    let mut next = tree.clone();
    let mut stream = rng.entity_stream(TREE_STREAM, tree.id().raw());
    let seeds = next.update(config, region, wind, &mut stream)?;
    Ok((next, seeds))
}

pub fn sweep(
    world: &World,
    config: &SimulationConfig,
    region: &BoundingBox,
    wind: Wind,
    rng: &RngManager,
) -> Result<SweepOutcome, ConfigError> {
    let alive: Vec<&Tree> = world
        .alive_ids()
        .iter()
        .filter_map(|id| world.tree(*id))
        .collect();

    let results: Vec<(Tree, Vec<SeedCandidate>)> = if config.parallel {
        alive
            .par_iter()
            .map(|tree| advance(tree, config, region, wind, rng))
            .collect::<Result<_, _>>()?
    } else {
        alive
            .iter()
            .map(|tree| advance(tree, config, region, wind, rng))
            .collect::<Result<_, _>>()?
    };

    let mut outcome = SweepOutcome {
        updated: Vec::with_capacity(results.len()),
        seeds: Vec::new(),
    };
    for (tree, seeds) in results {
        let parent = tree.id();
        outcome
            .seeds
            .extend(seeds.into_iter().enumerate().map(|(index, seed)| EmittedSeed {
                parent,
                index,
                seed,
            }));
        outcome.updated.push(tree);
    }
    outcome
        .seeds
        .sort_by_key(|emitted| (emitted.parent, emitted.index));
    Ok(outcome)
}
