//! Spatial index - uniform grid of lat/long cells over the living trees

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::geodesy::{self, BoundingBox, GeoPoint};
use crate::world::TreeId;

/// Cell position in the grid, obtained by truncating coordinates to the
/// cell size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub row: i64,
    pub col: i64,
}

/// Handle stored in the grid. Positions never change once a tree exists, so
/// the handle carries no mutable tree state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridEntry {
    pub id: TreeId,
    pub position: GeoPoint,
}

fn entry_order(a: &GridEntry, b: &GridEntry) -> Ordering {
    a.position
        .lat
        .total_cmp(&b.position.lat)
        .then(a.position.lon.total_cmp(&b.position.lon))
        .then(a.id.cmp(&b.id))
}

/// Grid over living trees. Each cell keeps its entries sorted by
/// (lat, long, id).
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size_deg: f64,
    cells: HashMap<CellKey, Vec<GridEntry>>,
    locations: HashMap<TreeId, CellKey>,
}

impl SpatialGrid {
    pub fn new(cell_size_deg: f64) -> Self {
        Self {
            cell_size_deg,
            cells: HashMap::new(),
            locations: HashMap::new(),
        }
    }

    pub fn cell_size_deg(&self) -> f64 {
        self.cell_size_deg
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, id: TreeId) -> bool {
        self.locations.contains_key(&id)
    }

    /// Convert a position to the key of the cell containing it
    pub fn cell_of(&self, position: GeoPoint) -> CellKey {
        CellKey {
            row: (position.lat / self.cell_size_deg).floor() as i64,
            col: (position.lon / self.cell_size_deg).floor() as i64,
        }
    }

    /// Insert a tree, replacing any previous entry for the same id.
    pub fn insert(&mut self, id: TreeId, position: GeoPoint) {
        self.remove(id);
        let key = self.cell_of(position);
        let entry = GridEntry { id, position };
        let cell = self.cells.entry(key).or_default();
        let index = cell.partition_point(|other| entry_order(other, &entry) == Ordering::Less);
        cell.insert(index, entry);
        self.locations.insert(id, key);
    }

    pub fn remove(&mut self, id: TreeId) -> bool {
        let Some(key) = self.locations.remove(&id) else {
            return false;
        };
        if let Some(cell) = self.cells.get_mut(&key) {
            cell.retain(|entry| entry.id != id);
            if cell.is_empty() {
                self.cells.remove(&key);
            }
        }
        true
    }

    pub fn remove_all(&mut self, ids: impl IntoIterator<Item = TreeId>) -> usize {
        ids.into_iter().filter(|id| self.remove(*id)).count()
    }

    /// All entries inside `bbox`, ordered by (lat, long, id). Both axes are
    /// checked for every candidate taken from the overlapping cells.
    pub fn range_query(&self, bbox: &BoundingBox) -> Vec<GridEntry> {
        let low = self.cell_of(GeoPoint::new(bbox.min_lat, bbox.min_lon));
        let high = self.cell_of(GeoPoint::new(bbox.max_lat, bbox.max_lon));
        let span = (high.row - low.row + 1).saturating_mul(high.col - low.col + 1);

        let mut result = Vec::new();
        if span > 0 && (span as usize) <= self.cells.len() {
            for row in low.row..=high.row {
                for col in low.col..=high.col {
                    if let Some(cell) = self.cells.get(&CellKey { row, col }) {
                        result.extend(cell.iter().filter(|entry| bbox.contains(entry.position)));
                    }
                }
            }
        } else {
            // Huge boxes touch more cells than exist; scan the occupied ones.
            for cell in self.cells.values() {
                result.extend(cell.iter().filter(|entry| bbox.contains(entry.position)));
            }
        }
        result.sort_by(entry_order);
        result
    }

    /// Living trees within `radius_m` metres of `center`.
    pub fn within_radius(&self, center: GeoPoint, radius_m: f64) -> Vec<GridEntry> {
        let bbox = BoundingBox::around(center, radius_m);
        let mut hits = self.range_query(&bbox);
        hits.retain(|entry| geodesy::distance_m(center, entry.position) < radius_m);
        hits
    }

    /// Whether any living tree lies strictly closer than `radius_m` metres.
    pub fn any_within(&self, center: GeoPoint, radius_m: f64) -> bool {
        let bbox = BoundingBox::around(center, radius_m);
        self.range_query(&bbox)
            .iter()
            .any(|entry| geodesy::distance_m(center, entry.position) < radius_m)
    }

    /// Every entry, ordered by (lat, long, id).
    pub fn entries(&self) -> Vec<GridEntry> {
        let mut all: Vec<GridEntry> = self.cells.values().flatten().copied().collect();
        all.sort_by(entry_order);
        all
    }
}
