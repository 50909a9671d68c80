use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::{Level, LevelFilter, Metadata, Record};

use urban_forest::{
    engine::{EngineBuilder, EngineSettings},
    scenario::ScenarioLoader,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Urban tree population simulation")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/vienna_sample.yaml")]
    scenario: PathBuf,

    /// Override the number of simulated years
    #[arg(long)]
    years: Option<u32>,

    /// Override the scenario's random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override snapshot interval in years
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Maximum log level
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

struct MinimalLogger;

impl log::Log for MinimalLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if record.level() <= Level::Warn {
            eprintln!("{:<5} {}", record.level(), record.args());
        } else {
            println!("{:<5} {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: MinimalLogger = MinimalLogger;

fn main() -> Result<()> {
    let cli = Cli::parse();
    log::set_logger(&LOGGER)?;
    log::set_max_level(cli.log_level);

    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let mut world = scenario.build_world()?;
    let years = scenario.years(cli.years);

    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
        seed: cli.seed.unwrap_or(scenario.seed),
        snapshot_interval_years: cli
            .snapshot_interval
            .unwrap_or(scenario.snapshot_interval_years),
        snapshot_dir: cli
            .snapshot_dir
            .unwrap_or_else(|| PathBuf::from("snapshots")),
    };

    let mut engine = EngineBuilder::new(settings, scenario.simulation.clone()).build()?;
    engine.run(&mut world, years)?;
    println!("{world}");
    Ok(())
}
