//! Deterministic random number generation
//!
//! Every stochastic decision draws from a ChaCha8 stream whose seed is derived
//! from (master seed, stream, entity, year). A tree's draws therefore depend
//! only on its id and the year, never on the order trees are visited in.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Identifies an independent family of streams.
pub type StreamId = u32;

/// Yearly wind sample.
pub const WIND_STREAM: StreamId = 1;
/// Per-tree growth, mortality and dispersal draws.
pub const TREE_STREAM: StreamId = 2;
/// Order in which seeds compete for space.
pub const RECRUITMENT_STREAM: StreamId = 3;

#[derive(Debug, Clone)]
pub struct RngManager {
    master_seed: u64,
    current_year: i64,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            master_seed: seed,
            current_year: 0,
        }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Select the year all following streams belong to
    pub fn set_year(&mut self, year: i64) {
        self.current_year = year;
    }

    pub fn current_year(&self) -> i64 {
        self.current_year
    }

    /// Stream shared by a whole phase of the current year
    pub fn stream(&self, stream: StreamId) -> ChaCha8Rng {
        self.entity_stream(stream, 0)
    }

    /// Stream owned by a single entity for the current year
    pub fn entity_stream(&self, stream: StreamId, entity_id: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.derive_seed(stream, entity_id, self.current_year))
    }

    fn derive_seed(&self, stream: StreamId, entity_id: u64, year: i64) -> u64 {
        let mut seed = self.master_seed;
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seed ^= (stream as u64).wrapping_mul(1103515245);
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seed ^= entity_id.wrapping_mul(48271);
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seed ^= (year as u64).wrapping_mul(69069);
        seed
    }
}

impl Default for RngManager {
    fn default() -> Self {
        Self::new(42)
    }
}
