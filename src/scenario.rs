use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{config::SimulationConfig, error::ConfigError, tree::TreeRecord, world::World};

fn default_snapshot_interval_years() -> u64 {
    0
}

/// A simulation run as described in a YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default = "default_snapshot_interval_years")]
    pub snapshot_interval_years: u64,
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub trees: Vec<TreeRecord>,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .simulation
            .validate()
            .with_context(|| format!("Invalid simulation settings in {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn build_world(&self) -> Result<World, ConfigError> {
        World::populate(&self.simulation, &self.trees)
    }

    pub fn years(&self, override_years: Option<u32>) -> u32 {
        override_years.unwrap_or(self.simulation.years)
    }
}
