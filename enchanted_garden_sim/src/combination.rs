// Special-combination discovery and rare-species bookkeeping.
//
// After any plant lands on the grid (planted or bred), the species in its
// 8-neighborhood plus its own species form a set. Every special combination
// whose required species are all in that set, and which has not been
// discovered yet, is newly discovered. Both discovery sets only ever grow.
//
// See also: `catalog.rs` for `SpecialCombination`, `sim.rs` for the
// notifications and achievement entries a discovery produces.

use crate::catalog::{PlantCatalog, SpecialCombination};
use crate::grid::GardenGrid;
use crate::types::{GridCoord, Species};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverySets {
    pub rare_plants_seen: BTreeSet<Species>,
    pub combos_discovered: BTreeSet<String>,
}

impl DiscoverySets {
    /// Record a non-common species. Returns `true` the first time.
    pub fn see_rare(&mut self, species: Species) -> bool {
        self.rare_plants_seen.insert(species)
    }

    /// Mark every combination completed around `coord` as discovered and
    /// return them in catalog order.
    pub fn discover_around<'c>(
        &mut self,
        grid: &GardenGrid,
        catalog: &'c PlantCatalog,
        coord: GridCoord,
    ) -> Vec<&'c SpecialCombination> {
        let found = newly_completed(grid, catalog, coord, &self.combos_discovered);
        for combo in &found {
            self.combos_discovered.insert(combo.id.clone());
        }
        found
    }
}

/// The species at `coord` plus every species in its 8-neighborhood.
pub fn neighborhood_species(grid: &GardenGrid, coord: GridCoord) -> BTreeSet<Species> {
    std::iter::once(coord)
        .chain(grid.neighbors(coord))
        .filter_map(|c| grid.species_at(c))
        .collect()
}

/// Undiscovered combinations whose required set is present around `coord`.
pub fn newly_completed<'c>(
    grid: &GardenGrid,
    catalog: &'c PlantCatalog,
    coord: GridCoord,
    discovered: &BTreeSet<String>,
) -> Vec<&'c SpecialCombination> {
    let present = neighborhood_species(grid, coord);
    catalog
        .combinations()
        .iter()
        .filter(|combo| !discovered.contains(&combo.id))
        .filter(|combo| combo.plants.iter().all(|s| present.contains(s)))
        .collect()
}
