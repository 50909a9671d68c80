use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::models::dispersal::Wind;
use crate::models::growth::MAX_HEIGHT_LEVEL;
use crate::spatial::SpatialGrid;
use crate::statistics::{StatRow, StatisticsTracker, YearActivity};
use crate::tree::{Tree, TreeRecord, TreeView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeId(u64);

impl TreeId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Serialize)]
pub struct WorldSnapshot {
    pub scenario: String,
    pub year: i32,
    pub written_at: DateTime<Utc>,
    pub total_trees: usize,
    pub dead_trees: usize,
    pub alive: Vec<TreeView>,
    pub latest: Option<StatRow>,
}

/// Every tree ever planted or recruited, the spatially indexed alive subset
/// and the yearly statistics.
#[derive(Debug, Clone)]
pub struct World {
    next_id: u64,
    starting_year: i32,
    year: i32,
    trees: BTreeMap<TreeId, Tree>,
    alive: Vec<TreeId>,
    grid: SpatialGrid,
    statistics: StatisticsTracker,
}

impl World {
    /// Builds the initial population and its statistics row.
    ///
    /// Records outside the region, with an out-of-range height, a repeated id
    /// or the reserved id `u64::MAX` are skipped with a warning. An unknown
    /// species on a record that would otherwise be kept is fatal.
    pub fn populate(
        config: &SimulationConfig,
        records: &[TreeRecord],
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let region = config.bounds()?;
        let mut world = Self {
            next_id: 0,
            starting_year: config.starting_year,
            year: config.starting_year,
            trees: BTreeMap::new(),
            alive: Vec::with_capacity(records.len()),
            grid: SpatialGrid::new(config.grid_cell_deg),
            statistics: StatisticsTracker::new(),
        };

        for record in records {
            let id = TreeId::new(record.id);
            if record.id == u64::MAX {
                warn!("Skipping tree {}: id is reserved", record.id);
                continue;
            }
            if !region.contains(record.position()) {
                warn!(
                    "Skipping tree {} at ({}, {}): outside the simulated region",
                    record.id, record.lat, record.lon
                );
                continue;
            }
            if record.height > MAX_HEIGHT_LEVEL {
                warn!(
                    "Skipping tree {}: height level {} above {}",
                    record.id, record.height, MAX_HEIGHT_LEVEL
                );
                continue;
            }
            if world.trees.contains_key(&id) {
                warn!("Skipping tree {}: id already in use", record.id);
                continue;
            }
            let spreading_factor = config.species.spreading_factor(record.species)?;
            world.next_id = world.next_id.max(record.id + 1);
            world.insert_tree(Tree::from_record(record, spreading_factor));
        }

        let alive_species: Vec<_> = world.alive_trees().map(|tree| tree.species).collect();
        world.statistics.record(world.starting_year, alive_species, None, YearActivity::default());
        Ok(world)
    }

    pub fn starting_year(&self) -> i32 {
        self.starting_year
    }

    /// Year of the most recent statistics row.
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn years_elapsed(&self) -> u32 {
        (self.year - self.starting_year) as u32
    }

    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }

    pub fn total_count(&self) -> usize {
        self.trees.len()
    }

    pub fn dead_count(&self) -> usize {
        self.trees.len() - self.alive.len()
    }

    /// Id the next recruit will receive.
    pub fn next_id(&self) -> TreeId {
        TreeId::new(self.next_id)
    }

    pub fn tree(&self, id: TreeId) -> Option<&Tree> {
        self.trees.get(&id)
    }

    /// All trees, dead ones included, in id order.
    pub fn trees(&self) -> impl Iterator<Item = &Tree> + '_ {
        self.trees.values()
    }

    /// Alive trees in the order they joined the population.
    pub fn alive_trees(&self) -> impl Iterator<Item = TreeView> + '_ {
        self.alive.iter().filter_map(|id| self.trees.get(id)).map(Tree::view)
    }

    pub fn alive_ids(&self) -> &[TreeId] {
        &self.alive
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn statistics(&self) -> &StatisticsTracker {
        &self.statistics
    }

    pub fn snapshot(&self, scenario: &str) -> WorldSnapshot {
        WorldSnapshot {
            scenario: scenario.to_string(),
            year: self.year,
            written_at: Utc::now(),
            total_trees: self.total_count(),
            dead_trees: self.dead_count(),
            alive: self.alive_trees().collect(),
            latest: self.statistics.latest().cloned(),
        }
    }

    /// Fails when `count` more ids would run past `u64::MAX`.
    pub(crate) fn reserve_ids(&self, count: usize) -> Result<(), ConfigError> {
        match self.next_id.checked_add(count as u64) {
            Some(_) => Ok(()),
            None => Err(ConfigError::IdsExhausted {
                next_id: self.next_id,
                requested: count,
            }),
        }
    }

    /// Callers reserve ids with [`World::reserve_ids`] first.
    pub(crate) fn allocate(&mut self) -> TreeId {
        let id = TreeId::new(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn insert_tree(&mut self, tree: Tree) {
        let id = tree.id();
        self.statistics.observe_species(tree.species());
        self.grid.insert(id, tree.position());
        self.alive.push(id);
        self.trees.insert(id, tree);
    }

    /// Stores this year's tree states and drops the trees that died from the
    /// alive set and the grid in one batch. Returns the number of deaths.
    pub(crate) fn commit_updates(&mut self, updated: Vec<Tree>) -> u64 {
        let mut dead = HashSet::new();
        for tree in updated {
            if !tree.is_alive() {
                dead.insert(tree.id());
            }
            self.trees.insert(tree.id(), tree);
        }
        if !dead.is_empty() {
            self.alive.retain(|id| !dead.contains(id));
            self.grid.remove_all(dead.iter().copied());
        }
        dead.len() as u64
    }

    pub(crate) fn record_year(
        &mut self,
        year: i32,
        wind: Wind,
        activity: YearActivity,
    ) -> &StatRow {
        self.year = year;
        let alive_species: Vec<_> = self.alive_trees().map(|tree| tree.species).collect();
        self.statistics.record(year, alive_species, Some(wind), activity)
    }
}

impl fmt::Display for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Population:")?;
        writeln!(f, "\t- Started in year {}", self.starting_year)?;
        writeln!(f, "\t- {} trees in total", self.total_count())?;
        writeln!(f, "\t- {} trees dead", self.dead_count())?;
        writeln!(f)?;
        writeln!(f, "\t- Population statistic")?;
        write!(f, "{}", self.statistics)
    }
}
