use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use tempfile::tempdir;
use urban_forest::{
    config::WindStrategy,
    engine::{self, EngineBuilder, EngineSettings},
    geodesy::{distance_m, GeoPoint},
    models::{MortalityModel, Wind},
    rng::RngManager,
    scenario::{Scenario, ScenarioLoader},
    species::{SpeciesCode, SpeciesTable},
    systems,
    tree::TreeRecord,
    ConfigError, SimulationConfig, World,
};

fn scenario_loader() -> ScenarioLoader {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
}

fn vienna_sample() -> Scenario {
    scenario_loader()
        .load("scenarios/vienna_sample.yaml")
        .expect("scenario parses")
}

fn settings(seed: u64, snapshot_dir: PathBuf, snapshot_interval: u64) -> EngineSettings {
    EngineSettings {
        scenario_name: "vienna_sample".into(),
        seed,
        snapshot_interval_years: snapshot_interval,
        snapshot_dir,
    }
}

fn run_sample(seed: u64, years: u32, parallel: bool) -> World {
    let scenario = vienna_sample();
    let temp = tempdir().unwrap();
    let mut world = scenario.build_world().unwrap();
    let mut engine = EngineBuilder::new(
        settings(seed, temp.path().to_path_buf(), 0),
        scenario.simulation.clone(),
    )
    .with_parallel_sweep(parallel)
    .build()
    .unwrap();
    engine.run(&mut world, years).unwrap();
    world
}

fn small_region() -> SimulationConfig {
    SimulationConfig::for_region(GeoPoint::new(48.10, 16.18), GeoPoint::new(48.33, 16.58))
}

fn record(id: u64, lat: f64, lon: f64, species: u16, age: u32) -> TreeRecord {
    TreeRecord {
        id,
        lat,
        lon,
        species: SpeciesCode(species),
        height: 3,
        age,
    }
}

#[test]
fn scenario_loader_reads_fixture() {
    let scenario = vienna_sample();
    assert_eq!(scenario.name, "vienna_sample");
    assert_eq!(scenario.seed, 42);
    assert_eq!(scenario.trees.len(), 12);
    assert_eq!(scenario.simulation.starting_year, 2023);
    assert_eq!(scenario.simulation.species, SpeciesTable::default());

    let world = scenario.build_world().unwrap();
    assert_eq!(world.alive_count(), 12);
    let initial = world.statistics().latest().unwrap();
    assert_eq!(initial.year, 2023);
    assert_eq!(initial.population, 12);
    assert_eq!(initial.species_count(SpeciesCode(1)), 2);
}

#[test]
fn equal_seeds_give_equal_histories() {
    let a = run_sample(7, 8, true);
    let b = run_sample(7, 8, true);
    assert_eq!(a.statistics().rows(), b.statistics().rows());
    assert_eq!(a.alive_ids(), b.alive_ids());
    assert_eq!(
        a.alive_trees().collect::<Vec<_>>(),
        b.alive_trees().collect::<Vec<_>>()
    );
}

#[test]
fn parallel_and_sequential_sweeps_agree() {
    let parallel = run_sample(11, 6, true);
    let sequential = run_sample(11, 6, false);
    assert_eq!(parallel.statistics().rows(), sequential.statistics().rows());
    assert_eq!(parallel.alive_ids(), sequential.alive_ids());
}

#[test]
fn population_accounting_balances_every_year() {
    let world = run_sample(3, 10, true);
    let rows = world.statistics().rows();
    assert_eq!(rows.len(), 11);
    for pair in rows.windows(2) {
        let (prev, row) = (&pair[0], &pair[1]);
        assert_eq!(row.year, prev.year + 1);
        assert_eq!(row.population, prev.population - row.deaths + row.recruits);
        assert!(row.recruits <= row.seeds);
        assert!(row.wind.is_some());
    }
    for row in rows {
        assert_eq!(row.per_species.values().sum::<u64>(), row.population);
    }
    assert_eq!(world.alive_count() as u64, rows.last().unwrap().population);
    assert_eq!(world.total_count(), world.alive_count() + world.dead_count());
}

#[test]
fn recruits_get_fresh_ids_and_keep_their_distance() {
    let scenario = vienna_sample();
    let mut world = scenario.build_world().unwrap();
    let config = scenario.simulation.clone();
    let mut rng = RngManager::new(scenario.seed);

    for year in 0..5 {
        let before: HashSet<_> = world.trees().map(|tree| tree.id()).collect();
        let first_new_id = world.next_id();
        let wind = Wind {
            direction_deg: 45.0 * f64::from(year),
            strength: 10.0,
        };
        engine::tick(&mut world, &config, wind, &mut rng).unwrap();

        let alive: Vec<_> = world.alive_trees().collect();
        for recruit in alive.iter().filter(|tree| !before.contains(&tree.id)) {
            assert!(recruit.id >= first_new_id);
            assert_eq!(recruit.age, 0);
            let radius = config.exclusion_radius(recruit.species).unwrap();
            for other in alive.iter().filter(|tree| tree.id < recruit.id) {
                assert!(
                    distance_m(recruit.position, other.position) >= radius,
                    "recruit {} stands within {radius} m of tree {}",
                    recruit.id,
                    other.id
                );
            }
        }
    }
}

#[test]
fn immortal_trees_without_germination_stay_put() {
    let mut config = small_region();
    config.mortality = MortalityModel::immortal();
    config.germination_fraction = 0.0;
    let records = [
        record(0, 48.15, 16.20, 1, 40),
        record(1, 48.20, 16.40, 6, 40),
        record(2, 48.30, 16.55, 9, 40),
    ];
    let mut world = World::populate(&config, &records).unwrap();
    let mut rng = RngManager::new(5);

    for _ in 0..5 {
        let row = engine::tick(&mut world, &config, Wind::calm(), &mut rng).unwrap();
        assert_eq!(row.population, 3);
        assert_eq!(row.deaths, 0);
        assert_eq!(row.seeds, 0);
        assert_eq!(row.recruits, 0);
    }
    assert_eq!(world.total_count(), 3);
    assert!(world.trees().all(|tree| tree.age() == 45));
}

#[test]
fn calm_wind_keeps_seeds_around_their_parents() {
    let mut config = small_region();
    config.mortality = MortalityModel::immortal();
    let records = [
        record(0, 48.15, 16.20, 1, 40),
        record(1, 48.20, 16.40, 6, 40),
        record(2, 48.30, 16.55, 9, 40),
    ];
    let mut world = World::populate(&config, &records).unwrap();
    let region = config.bounds().unwrap();
    let mut rng = RngManager::new(5);
    rng.set_year(2024);

    let outcome = systems::sweep(&world, &config, &region, Wind::calm(), &rng).unwrap();
    assert!(!outcome.seeds.is_empty());
    for emitted in &outcome.seeds {
        let parent = world.tree(emitted.parent).unwrap();
        let reach = config.base_seeding_radius_m * parent.spreading_factor();
        let distance = distance_m(parent.position(), emitted.seed.position);
        assert!(distance <= reach + 0.01, "seed {distance} m from tree {}", emitted.parent);
        assert_eq!(emitted.seed.species, parent.species());
    }

    let row = engine::tick(&mut world, &config, Wind::calm(), &mut rng).unwrap();
    assert_eq!(row.deaths, 0);
    assert_eq!(row.seeds, outcome.seeds.len() as u64);
    assert_eq!(row.population, 3 + row.recruits);

    let alive: Vec<_> = world.alive_trees().collect();
    for recruit in alive.iter().filter(|tree| tree.age == 0) {
        let radius = config.exclusion_radius(recruit.species).unwrap();
        for other in alive.iter().filter(|tree| tree.id < recruit.id) {
            assert!(distance_m(recruit.position, other.position) >= radius);
        }
    }
}

#[test]
fn exhausted_ids_fail_the_year_without_changes() {
    let mut config = small_region();
    config.mortality = MortalityModel::immortal();
    let mut world = World::populate(&config, &[record(u64::MAX - 1, 48.2, 16.3, 1, 100)]).unwrap();
    let mut rng = RngManager::new(2);

    let err = engine::tick(&mut world, &config, Wind::calm(), &mut rng).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::IdsExhausted {
            next_id: u64::MAX,
            ..
        }
    ));
    assert_eq!(world.year(), 2023);
    assert_eq!(world.total_count(), 1);
    assert_eq!(world.statistics().len(), 1);
    assert_eq!(world.trees().next().unwrap().age(), 100);
}

#[test]
fn ancient_tree_dies_without_seeding() {
    let mut config = small_region();
    config.mortality = MortalityModel {
        asymptote: 1.0,
        min_survival: 0.0,
        ..MortalityModel::default()
    };
    let mut world = World::populate(&config, &[record(0, 48.2, 16.3, 1, 10_000)]).unwrap();
    let mut rng = RngManager::new(1);

    let row = engine::tick(&mut world, &config, Wind::calm(), &mut rng).unwrap();
    assert_eq!(row.population, 0);
    assert_eq!(row.deaths, 1);
    assert_eq!(row.seeds, 0);
    assert_eq!(row.recruits, 0);
    assert_eq!(world.alive_count(), 0);
    assert_eq!(world.dead_count(), 1);
    assert!(world.grid().is_empty());
}

#[test]
fn empty_population_records_zero_rows() {
    let config = small_region();
    let mut world = World::populate(&config, &[]).unwrap();
    let mut rng = RngManager::new(9);

    let row = engine::tick(&mut world, &config, Wind::calm(), &mut rng).unwrap();
    assert_eq!(row.year, 2024);
    assert_eq!(row.population, 0);
    assert_eq!(row.deaths, 0);
    assert_eq!(row.seeds, 0);
    assert_eq!(row.recruits, 0);
    assert!(row.per_species.is_empty());
    assert_eq!(row.species_share(SpeciesCode(1)), 0.0);
}

#[test]
fn record_order_does_not_change_the_outcome() {
    let scenario = vienna_sample();
    let mut reversed = scenario.trees.clone();
    reversed.reverse();
    let wind = Wind {
        direction_deg: 120.0,
        strength: 12.0,
    };

    let mut forward = World::populate(&scenario.simulation, &scenario.trees).unwrap();
    let mut backward = World::populate(&scenario.simulation, &reversed).unwrap();
    let mut rng_a = RngManager::new(21);
    let mut rng_b = RngManager::new(21);
    for _ in 0..4 {
        let a = engine::tick(&mut forward, &scenario.simulation, wind, &mut rng_a).unwrap();
        let b = engine::tick(&mut backward, &scenario.simulation, wind, &mut rng_b).unwrap();
        assert_eq!(a, b);
    }

    let mut ids_a: Vec<_> = forward.alive_trees().collect();
    let mut ids_b: Vec<_> = backward.alive_trees().collect();
    ids_a.sort_by_key(|tree| tree.id);
    ids_b.sort_by_key(|tree| tree.id);
    assert_eq!(ids_a, ids_b);
}

#[test]
fn failed_year_leaves_world_untouched() {
    let mut config = small_region();
    config.mortality = MortalityModel::immortal();
    let mut world = World::populate(&config, &[record(0, 48.2, 16.3, 1, 100)]).unwrap();
    let before_rows = world.statistics().rows().to_vec();

    // Species 1 scatters seeds the narrower table cannot resolve.
    let mut narrowed = config.clone();
    let budget: BTreeMap<u8, u32> = (0..=8).map(|level| (level, 100)).collect();
    narrowed.species =
        SpeciesTable::new(BTreeMap::from([(SpeciesCode(2), 1.0)]), budget).unwrap();

    let mut rng = RngManager::new(4);
    let err = engine::tick(&mut world, &narrowed, Wind::calm(), &mut rng).unwrap_err();
    assert_eq!(err, ConfigError::UnknownSpecies(SpeciesCode(1)));
    assert_eq!(world.year(), 2023);
    assert_eq!(world.statistics().rows(), before_rows.as_slice());
    assert_eq!(world.tree(world.alive_ids()[0]).unwrap().age(), 100);
    assert_eq!(world.total_count(), 1);

    let mut broken = config.clone();
    broken.region.corner_b = broken.region.corner_a;
    assert!(matches!(
        engine::tick(&mut world, &broken, Wind::calm(), &mut rng),
        Err(ConfigError::MalformedRegion(_))
    ));
    assert_eq!(world.year(), 2023);
}

#[test]
fn engine_emits_snapshots() {
    let scenario = vienna_sample();
    let temp = tempdir().unwrap();
    let mut world = scenario.build_world().unwrap();
    let mut engine = EngineBuilder::new(
        settings(scenario.seed, temp.path().to_path_buf(), 2),
        scenario.simulation.clone(),
    )
    .with_wind(WindStrategy::Fixed {
        direction_deg: 270.0,
        strength: 8.0,
    })
    .build()
    .unwrap();
    engine.run(&mut world, 5).unwrap();

    let dir = temp.path().join("vienna_sample");
    assert!(dir.join("year_2025.json").exists());
    assert!(dir.join("year_2027.json").exists());
    assert!(!dir.join("year_2024.json").exists());
    assert!(!dir.join("year_2028.json").exists());

    let json = std::fs::read_to_string(dir.join("year_2027.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["year"], 2027);
    assert_eq!(value["scenario"], "vienna_sample");
}

#[test]
fn unwritable_snapshot_does_not_fail_the_year() {
    let scenario = vienna_sample();
    let temp = tempdir().unwrap();
    let blocker = temp.path().join("not_a_dir");
    std::fs::write(&blocker, "").unwrap();
    let mut world = scenario.build_world().unwrap();
    let mut engine =
        EngineBuilder::new(settings(scenario.seed, blocker, 1), scenario.simulation.clone())
            .build()
            .unwrap();

    let row = engine.tick(&mut world).unwrap();
    assert_eq!(row.year, 2024);
    assert_eq!(world.year(), 2024);

    let mut years = Vec::new();
    engine
        .run_with_hook(&mut world, 2, |row| years.push(row.year))
        .unwrap();
    assert_eq!(years, vec![2025, 2026]);
    assert_eq!(world.statistics().len(), 4);
}

#[test]
fn invalid_configuration_is_rejected_by_builder() {
    let mut config = small_region();
    config.germination_fraction = 2.0;
    let temp = tempdir().unwrap();
    let result = EngineBuilder::new(settings(1, temp.path().to_path_buf(), 0), config).build();
    assert!(result.is_err());
}
