// Cross-pollination: manual pairing and automatic spread.
//
// Manual breeding pairs two adjacent plants chosen by the player. It costs
// magic, draws an offspring species uniformly from the parents' combined
// offspring pool, and places it in a random empty cell next to either
// parent. Checks run in a fixed order and the first failure wins:
// `EmptyCellSelected`, `InsufficientResource`, `NotAdjacent`,
// `NoOffspringPossible`, `NoEmptySpace`. Nothing is drawn from the random
// source until every check has passed.
//
// Automatic spread is the free variant a mature plant may trigger on its
// own: roll the plant's own pollination chance, pick an unlike-species
// neighbor as partner, and draw from the same pool. A plant spreads this way
// at most once (`has_cross_pollinated`).
//
// Offspring pools keep first-seen order (parent A's list, then B's) with
// duplicates removed, so repeated entries carry no extra weight.
//
// See also: `sim.rs` for the command handler that applies a manual plan,
// `ecosystem.rs` for the mature-plant handling that calls `auto_spread()`.

use crate::catalog::PlantCatalog;
use crate::command::CommandError;
use crate::economy::ResourcePool;
use crate::grid::GardenGrid;
use crate::types::{GridCoord, Species};
use enchanted_garden_prng::RandomSource;

/// Outcome of a successful manual breeding check: what to place and where.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BreedingPlan {
    pub offspring: Species,
    pub target: GridCoord,
}

/// Outcome of a successful automatic spread roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpreadOutcome {
    pub partner: GridCoord,
    pub offspring: Species,
}

/// Deduplicated union of both species' offspring lists, first-seen order.
pub fn offspring_pool(catalog: &PlantCatalog, a: Species, b: Species) -> Vec<Species> {
    let mut pool = Vec::new();
    for &child in catalog.get(a).offspring.iter().chain(&catalog.get(b).offspring) {
        if !pool.contains(&child) {
            pool.push(child);
        }
    }
    pool
}

/// Deduplicated union of the empty cells around either coordinate.
pub fn empty_cells_around(grid: &GardenGrid, a: GridCoord, b: GridCoord) -> Vec<GridCoord> {
    let mut cells: Vec<GridCoord> = Vec::new();
    for c in grid.empty_neighbors(a).into_iter().chain(grid.empty_neighbors(b)) {
        if !cells.contains(&c) {
            cells.push(c);
        }
    }
    cells
}

/// Validate a manual pairing and choose offspring and placement. Does not
/// mutate the grid or the pool; the caller applies the plan and pays.
pub fn plan_manual(
    grid: &GardenGrid,
    catalog: &PlantCatalog,
    resources: &ResourcePool,
    magic_cost: f32,
    first: GridCoord,
    second: GridCoord,
    rng: &mut impl RandomSource,
) -> Result<BreedingPlan, CommandError> {
    let (Some(a), Some(b)) = (grid.species_at(first), grid.species_at(second)) else {
        return Err(CommandError::EmptyCellSelected);
    };
    if !resources.can_spend_magic(magic_cost) {
        return Err(CommandError::InsufficientResource);
    }
    if !first.is_adjacent_to(second) {
        return Err(CommandError::NotAdjacent);
    }
    let pool = offspring_pool(catalog, a, b);
    if pool.is_empty() {
        return Err(CommandError::NoOffspringPossible);
    }
    let empty = empty_cells_around(grid, first, second);
    if empty.is_empty() {
        return Err(CommandError::NoEmptySpace);
    }

    let offspring = pool[rng.pick_index(pool.len())];
    let target = empty[rng.pick_index(empty.len())];
    Ok(BreedingPlan { offspring, target })
}

/// Try to cross-pollinate the plant at `source` with a random unlike
/// neighbor. On success the source is marked `has_cross_pollinated` and the
/// offspring species is returned for the caller to place.
pub fn auto_spread(
    grid: &mut GardenGrid,
    catalog: &PlantCatalog,
    source: GridCoord,
    rng: &mut impl RandomSource,
) -> Option<SpreadOutcome> {
    let plant = grid.get(source)?;
    if plant.has_cross_pollinated {
        return None;
    }
    let species = plant.species;
    if !rng.chance(catalog.get(species).pollination_chance) {
        return None;
    }

    let partners: Vec<GridCoord> = grid
        .occupied_neighbors(source)
        .into_iter()
        .filter(|&c| grid.species_at(c) != Some(species))
        .collect();
    let &partner = rng.pick(&partners)?;
    let partner_species = grid.species_at(partner)?;

    let pool = offspring_pool(catalog, species, partner_species);
    let &offspring = rng.pick(&pool)?;

    if let Some(plant) = grid.get_mut(source) {
        plant.has_cross_pollinated = true;
    }
    Some(SpreadOutcome { partner, offspring })
}
