use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    config::{SimulationConfig, WindStrategy},
    rng::RngManager,
    snapshot::SnapshotWriter,
    statistics::StatRow,
    systems::resolve_wind,
    world::World,
};

mod tick;

pub use tick::tick;

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub snapshot_interval_years: u64,
    pub snapshot_dir: PathBuf,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    config: SimulationConfig,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings, config: SimulationConfig) -> Self {
        Self { settings, config }
    }

    pub fn with_wind(mut self, wind: WindStrategy) -> Self {
        self.config.wind = wind;
        self
    }

    pub fn with_parallel_sweep(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn build(self) -> Result<Engine> {
        self.config
            .validate()
            .context("Invalid simulation configuration")?;
        Ok(Engine {
            rng: RngManager::new(self.settings.seed),
            snapshot_writer: SnapshotWriter::new(
                &self.settings.snapshot_dir,
                self.settings.snapshot_interval_years,
            ),
            config: self.config,
            settings: self.settings,
        })
    }
}

/// Drives a [`World`] through simulated years.
pub struct Engine {
    rng: RngManager,
    config: SimulationConfig,
    snapshot_writer: SnapshotWriter,
    settings: EngineSettings,
}

impl Engine {
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn scenario_name(&self) -> &str {
        &self.settings.scenario_name
    }

    /// Runs one year: draws the wind, advances the world and writes a
    /// snapshot when one is due. A failed snapshot is logged and does not
    /// fail the year, which has already been committed.
    pub fn tick(&mut self, world: &mut World) -> Result<StatRow> {
        let year = world.year() + 1;
        self.rng.set_year(i64::from(year));
        let wind = resolve_wind(&self.config.wind, &self.rng);
        let row = tick(world, &self.config, wind, &mut self.rng)
            .with_context(|| format!("Failed to simulate year {year}"))?;
        if let Err(err) = self
            .snapshot_writer
            .maybe_write(world, &self.settings.scenario_name)
        {
            warn!("Snapshot for year {} not written: {err:#}", row.year);
        }
        Ok(row)
    }

    pub fn run(&mut self, world: &mut World, years: u32) -> Result<()> {
        self.run_with_hook(world, years, |_| {})
    }

    /// Like [`Engine::run`], calling `hook` with every new statistics row.
    pub fn run_with_hook<F>(&mut self, world: &mut World, years: u32, mut hook: F) -> Result<()>
    where
        F: FnMut(&StatRow),
    {
        info!(
            "Simulating '{}' for {} years from {} with {} trees",
            self.settings.scenario_name,
            years,
            world.year(),
            world.alive_count()
        );
        for _ in 0..years {
            let row = self.tick(world)?;
            info!(
                "Year {}: {} alive, {} died, {} recruited",
                row.year, row.population, row.deaths, row.recruits
            );
            hook(&row);
        }
        Ok(())
    }
}
