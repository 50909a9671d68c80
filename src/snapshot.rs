use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::world::World;

/// Writes the alive set and latest statistics as JSON every
/// `interval_years` simulated years. An interval of 0 disables snapshots.
pub struct SnapshotWriter {
    output_dir: PathBuf,
    interval_years: u64,
}

impl SnapshotWriter {
    pub fn new(output_dir: impl AsRef<Path>, interval_years: u64) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            interval_years,
        }
    }

    pub fn is_due(&self, world: &World) -> bool {
        if self.interval_years == 0 {
            return false;
        }
        let elapsed = u64::from(world.years_elapsed());
        elapsed > 0 && elapsed % self.interval_years == 0
    }

    pub fn maybe_write(&self, world: &World, scenario_name: &str) -> Result<Option<PathBuf>> {
        if !self.is_due(world) {
            return Ok(None);
        }
        self.write(world, scenario_name).map(Some)
    }

    pub fn write(&self, world: &World, scenario_name: &str) -> Result<PathBuf> {
        let dir = self.output_dir.join(scenario_name);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;
        let path = dir.join(format!("year_{:04}.json", world.year()));
        let json = serde_json::to_string_pretty(&world.snapshot(scenario_name))?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        Ok(path)
    }
}
