//! Yearly population statistics.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::dispersal::Wind;
use crate::species::SpeciesCode;

/// State of the population at the end of one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRow {
    pub year: i32,
    pub population: u64,
    /// Alive count for every species seen so far, zeros included.
    pub per_species: BTreeMap<SpeciesCode, u64>,
    /// Absent for the initial row.
    pub wind: Option<Wind>,
    pub deaths: u64,
    pub seeds: u64,
    pub recruits: u64,
}

impl StatRow {
    pub fn species_count(&self, species: SpeciesCode) -> u64 {
        self.per_species.get(&species).copied().unwrap_or(0)
    }

    /// Share of the population belonging to `species`; 0 for an empty
    /// population.
    pub fn species_share(&self, species: SpeciesCode) -> f64 {
        if self.population == 0 {
            return 0.0;
        }
        self.species_count(species) as f64 / self.population as f64
    }
}

/// Counts gathered while a year is processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearActivity {
    pub deaths: u64,
    pub seeds: u64,
    pub recruits: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsTracker {
    species: BTreeSet<SpeciesCode>,
    rows: Vec<StatRow>,
}

impl StatisticsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe_species(&mut self, species: SpeciesCode) {
        self.species.insert(species);
    }

    pub fn known_species(&self) -> impl Iterator<Item = SpeciesCode> + '_ {
        self.species.iter().copied()
    }

    /// Appends a row. The first row may carry any year; later rows must
    /// follow on the previous year.
    pub fn record(
        &mut self,
        year: i32,
        alive_species: impl IntoIterator<Item = SpeciesCode>,
        wind: Option<Wind>,
        activity: YearActivity,
    ) -> &StatRow {
        if let Some(last) = self.rows.last() {
            debug_assert_eq!(year, last.year + 1, "statistics rows must be consecutive");
        }
        let mut per_species: BTreeMap<SpeciesCode, u64> =
            self.species.iter().map(|species| (*species, 0)).collect();
        let mut population = 0;
        for species in alive_species {
            self.species.insert(species);
            *per_species.entry(species).or_insert(0) += 1;
            population += 1;
        }
        self.rows.push(StatRow {
            year,
            population,
            per_species,
            wind,
            deaths: activity.deaths,
            seeds: activity.seeds,
            recruits: activity.recruits,
        });
        &self.rows[self.rows.len() - 1]
    }

    pub fn rows(&self) -> &[StatRow] {
        &self.rows
    }

    pub fn latest(&self) -> Option<&StatRow> {
        self.rows.last()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for StatisticsTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>6} {:>10}", "year", "population")?;
        for species in &self.species {
            write!(f, " {:>6}", format!("#{species}"))?;
        }
        writeln!(f)?;
        for row in &self.rows {
            write!(f, "{:>6} {:>10}", row.year, row.population)?;
            for species in &self.species {
                write!(f, " {:>6}", row.species_count(*species))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
