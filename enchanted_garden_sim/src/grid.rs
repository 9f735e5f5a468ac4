// The garden grid and the plants living on it.
//
// `GardenGrid` is a fixed W×H array of cells, each empty or holding one
// `PlantInstance`. Cells are stored row-major (`index = y * width + x`), so
// iterating `occupied_coords()` visits plants in the same row-major order
// the ecosystem tick uses.
//
// Indexing with an out-of-bounds coordinate panics: coordinates reaching the
// grid have already been validated at the command boundary, so a bad one is
// a programming error. Use `in_bounds()` to check untrusted input.
//
// See also: `ecosystem.rs` for the per-tick update of each instance,
// `breeding.rs` for offspring placement, `catalog.rs` for the species data
// an instance is created from.

use crate::catalog::PlantSpecies;
use crate::config::GameConfig;
use crate::types::{GridCoord, NEIGHBOR_OFFSETS, PlantTrait, Species};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Up to eight neighboring coordinates, in `NEIGHBOR_OFFSETS` order.
pub type Neighbors = SmallVec<[GridCoord; 8]>;

/// One living plant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlantInstance {
    pub species: Species,
    /// [0, 100]. The plant is removed when this reaches zero.
    pub health: f32,
    /// Never negative. Mature at `PlantParams::mature_growth`.
    pub growth: f32,
    /// Cell magic, [0, 100].
    pub magic: f32,
    /// Cell water, [0, 100].
    pub water: f32,
    pub evolved: bool,
    pub magical: bool,
    /// Set the first time this plant spreads automatically; it never spreads
    /// automatically again.
    pub has_cross_pollinated: bool,
    /// Garden time of the last automatic spread attempt.
    pub last_spread_ms: Option<u64>,
    /// Pollinating neighbors counted on the last tick.
    pub pollinators: u32,
    /// Copied from the species at creation; evolution raises `magic`.
    pub effects: BTreeMap<PlantTrait, f32>,
}

impl PlantInstance {
    /// A freshly planted (or freshly bred) plant.
    pub fn sprout(species: Species, data: &PlantSpecies, config: &GameConfig) -> Self {
        Self {
            species,
            health: config.plant.initial_health,
            growth: config.plant.initial_growth,
            magic: config.rarity(data.rarity).initial_magic,
            water: config.plant.initial_water,
            evolved: false,
            magical: false,
            has_cross_pollinated: false,
            last_spread_ms: None,
            pollinators: 0,
            effects: data.effects.clone(),
        }
    }

    /// Display stage 0..=3 (sprout to bloom).
    pub fn growth_stage(&self) -> usize {
        (self.growth.floor() as i64 - 1).clamp(0, 3) as usize
    }
}

/// Fixed-size garden.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GardenGrid {
    width: u32,
    height: u32,
    cells: Vec<Option<PlantInstance>>,
}

impl GardenGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn in_bounds(&self, coord: GridCoord) -> bool {
        coord.x >= 0 && coord.y >= 0 && (coord.x as u32) < self.width && (coord.y as u32) < self.height
    }

    fn index(&self, coord: GridCoord) -> usize {
        assert!(
            self.in_bounds(coord),
            "grid coordinate {coord} outside {}x{} garden",
            self.width,
            self.height
        );
        coord.y as usize * self.width as usize + coord.x as usize
    }

    fn coord_of(&self, index: usize) -> GridCoord {
        let w = self.width as usize;
        GridCoord::new((index % w) as i32, (index / w) as i32)
    }

    pub fn get(&self, coord: GridCoord) -> Option<&PlantInstance> {
        self.cells[self.index(coord)].as_ref()
    }

    pub fn get_mut(&mut self, coord: GridCoord) -> Option<&mut PlantInstance> {
        let i = self.index(coord);
        self.cells[i].as_mut()
    }

    pub fn species_at(&self, coord: GridCoord) -> Option<Species> {
        self.get(coord).map(|p| p.species)
    }

    pub fn is_empty(&self, coord: GridCoord) -> bool {
        self.get(coord).is_none()
    }

    /// Put a plant into an empty cell.
    ///
    /// Panics if the cell is occupied; callers check emptiness first.
    pub fn place(&mut self, coord: GridCoord, plant: PlantInstance) {
        let i = self.index(coord);
        assert!(self.cells[i].is_none(), "cell {coord} is already occupied");
        self.cells[i] = Some(plant);
    }

    /// Empty a cell, returning what was there.
    pub fn take(&mut self, coord: GridCoord) -> Option<PlantInstance> {
        let i = self.index(coord);
        self.cells[i].take()
    }

    /// In-bounds 8-neighbors of `coord`.
    pub fn neighbors(&self, coord: GridCoord) -> Neighbors {
        NEIGHBOR_OFFSETS
            .iter()
            .map(|&(dx, dy)| coord.offset(dx, dy))
            .filter(|&c| self.in_bounds(c))
            .collect()
    }

    pub fn empty_neighbors(&self, coord: GridCoord) -> Neighbors {
        self.neighbors(coord)
            .into_iter()
            .filter(|&c| self.is_empty(c))
            .collect()
    }

    pub fn occupied_neighbors(&self, coord: GridCoord) -> Neighbors {
        self.neighbors(coord)
            .into_iter()
            .filter(|&c| !self.is_empty(c))
            .collect()
    }

    /// Occupied cells in row-major order.
    pub fn occupied_coords(&self) -> Vec<GridCoord> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_some())
            .map(|(i, _)| self.coord_of(i))
            .collect()
    }

    pub fn plants(&self) -> impl Iterator<Item = (GridCoord, &PlantInstance)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| cell.as_ref().map(|p| (self.coord_of(i), p)))
    }

    pub fn plant_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PlantCatalog;

    fn rose() -> PlantInstance {
        let catalog = PlantCatalog::default();
        PlantInstance::sprout(
            Species::Rose,
            catalog.get(Species::Rose),
            &GameConfig::default(),
        )
    }

    #[test]
    fn sprout_uses_tier_magic() {
        let catalog = PlantCatalog::default();
        let config = GameConfig::default();
        let lotus = PlantInstance::sprout(
            Species::CrystalLotus,
            catalog.get(Species::CrystalLotus),
            &config,
        );
        assert_eq!(lotus.magic, 50.0);
        assert_eq!(lotus.health, 100.0);
        assert_eq!(lotus.growth, 1.0);
        assert_eq!(lotus.water, 10.0);
        assert!(!lotus.has_cross_pollinated);
        assert_eq!(rose().magic, 10.0);
    }

    #[test]
    fn growth_stage_bounds() {
        let mut plant = rose();
        assert_eq!(plant.growth_stage(), 0);
        plant.growth = 2.4;
        assert_eq!(plant.growth_stage(), 1);
        plant.growth = 9.0;
        assert_eq!(plant.growth_stage(), 3);
        plant.growth = 0.0;
        assert_eq!(plant.growth_stage(), 0);
    }

    #[test]
    fn corner_has_three_neighbors() {
        let grid = GardenGrid::new(20, 15);
        assert_eq!(grid.neighbors(GridCoord::new(0, 0)).len(), 3);
        assert_eq!(grid.neighbors(GridCoord::new(19, 14)).len(), 3);
        assert_eq!(grid.neighbors(GridCoord::new(5, 0)).len(), 5);
        assert_eq!(grid.neighbors(GridCoord::new(5, 5)).len(), 8);
    }

    #[test]
    fn place_take_and_row_major_order() {
        let mut grid = GardenGrid::new(4, 3);
        grid.place(GridCoord::new(3, 0), rose());
        grid.place(GridCoord::new(0, 1), rose());
        grid.place(GridCoord::new(1, 0), rose());
        assert_eq!(
            grid.occupied_coords(),
            vec![
                GridCoord::new(1, 0),
                GridCoord::new(3, 0),
                GridCoord::new(0, 1)
            ]
        );
        assert!(grid.take(GridCoord::new(3, 0)).is_some());
        assert!(grid.take(GridCoord::new(3, 0)).is_none());
        assert_eq!(grid.plant_count(), 2);
    }

    #[test]
    fn empty_neighbors_exclude_occupied() {
        let mut grid = GardenGrid::new(3, 3);
        let center = GridCoord::new(1, 1);
        grid.place(GridCoord::new(0, 0), rose());
        let empty = grid.empty_neighbors(center);
        assert_eq!(empty.len(), 7);
        assert!(!empty.contains(&GridCoord::new(0, 0)));
        assert_eq!(grid.occupied_neighbors(center).as_slice(), &[GridCoord::new(0, 0)]);
    }

    #[test]
    #[should_panic(expected = "already occupied")]
    fn double_place_panics() {
        let mut grid = GardenGrid::new(2, 2);
        grid.place(GridCoord::new(0, 0), rose());
        grid.place(GridCoord::new(0, 0), rose());
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn out_of_bounds_panics() {
        let grid = GardenGrid::new(2, 2);
        grid.get(GridCoord::new(2, 0));
    }
}
