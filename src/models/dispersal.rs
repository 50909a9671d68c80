//! Wind-driven seed dispersal.
//!
//! Seeds are scattered in a disk around a dispersal centre that the wind
//! pushes downwind of the parent. The centre is found on the ellipsoid; the
//! scatter around it uses a flat-earth offset, which is accurate enough for
//! the radii involved.

use std::f64::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geodesy::{self, BoundingBox, GeoPoint};
use crate::species::SpeciesCode;

/// Wind condition shared by every tree during one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    /// Bearing the wind blows towards, degrees clockwise from north.
    pub direction_deg: f64,
    pub strength: f64,
}

impl Wind {
    pub fn calm() -> Self {
        Self {
            direction_deg: 0.0,
            strength: 0.0,
        }
    }
}

/// How the distance from the dispersal centre is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadialSampling {
    /// Radius uniform in `[0, R)`. Seeds concentrate near the centre.
    #[default]
    Uniform,
    /// Radius `sqrt(u) * R`, uniform density over the disk.
    AreaUniform,
}

impl RadialSampling {
    fn radius<R: Rng + ?Sized>(self, max_radius: f64, rng: &mut R) -> f64 {
        let u: f64 = rng.gen();
        match self {
            RadialSampling::Uniform => u * max_radius,
            RadialSampling::AreaUniform => u.sqrt() * max_radius,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispersalParams {
    pub base_seeding_radius_m: f64,
    pub germination_fraction: f64,
    pub radial_sampling: RadialSampling,
}

/// A position where a seed landed. Lives for a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedCandidate {
    pub position: GeoPoint,
    pub species: SpeciesCode,
}

/// Seeds that germinate out of a height level's budget.
pub fn germinating_seeds(seed_budget: u32, germination_fraction: f64) -> usize {
    (f64::from(seed_budget) * germination_fraction).floor().max(0.0) as usize
}

/// Centre of the seed disk: `wind.strength * spreading_factor` metres
/// downwind of the parent.
pub fn dispersal_center(origin: GeoPoint, wind: Wind, spreading_factor: f64) -> GeoPoint {
    geodesy::destination(origin, wind.direction_deg, wind.strength * spreading_factor)
}

/// Scatters `seed_count` seeds and keeps those landing inside `region`.
#[allow(clippy::too_many_arguments)]
pub fn disperse<R: Rng + ?Sized>(
    origin: GeoPoint,
    species: SpeciesCode,
    wind: Wind,
    spreading_factor: f64,
    seed_count: usize,
    params: &DispersalParams,
    region: &BoundingBox,
    rng: &mut R,
) -> Vec<SeedCandidate> {
    let center = dispersal_center(origin, wind, spreading_factor);
    let max_radius = params.base_seeding_radius_m * spreading_factor;
    let mut seeds = Vec::with_capacity(seed_count);
    for _ in 0..seed_count {
        let angle = rng.gen::<f64>() * TAU;
        let radius = params.radial_sampling.radius(max_radius, rng);
        let position = geodesy::offset_flat(center, radius * angle.cos(), radius * angle.sin());
        if region.contains(position) {
            seeds.push(SeedCandidate { position, species });
        }
    }
    seeds
}
