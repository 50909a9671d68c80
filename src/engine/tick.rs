use log::debug;

use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::models::dispersal::Wind;
use crate::rng::RngManager;
use crate::statistics::{StatRow, YearActivity};
use crate::systems::{growth, recruitment};
use crate::world::World;

/// Advances `world` by one year under `wind`.
///
/// Everything that can fail runs before the world is touched, so an error
/// leaves the world exactly as it was.
pub fn tick(
    world: &mut World,
    config: &SimulationConfig,
    wind: Wind,
    rng: &mut RngManager,
) -> Result<StatRow, ConfigError> {
    let region = config.bounds()?;
    let year = world.year() + 1;
    rng.set_year(i64::from(year));

    let outcome = growth::sweep(world, config, &region, wind, rng)?;
    let seeds = outcome.seeds.len() as u64;
    let pending = recruitment::prepare(outcome.seeds, config, rng)?;
    world.reserve_ids(pending.len())?;

    let deaths = world.commit_updates(outcome.updated);
    let recruits = recruitment::admit(world, pending);
    debug!(
        "year {year}: {deaths} deaths, {seeds} seeds, {recruits} recruits, wind {:.0} deg x {:.1}",
        wind.direction_deg, wind.strength
    );

    let activity = YearActivity {
        deaths,
        seeds,
        recruits,
    };
    Ok(world.record_year(year, wind, activity).clone())
}
