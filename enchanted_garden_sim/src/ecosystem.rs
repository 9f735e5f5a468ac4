// Per-tick ecosystem update.
//
// Every plant alive at the start of the tick is updated once, row-major.
// Three scores are summed into its health delta:
//
//   - environmental score: each declared need adds its `met` score when the
//     need's condition holds and its `unmet` penalty otherwise. Water is met
//     by the cell's own water level, pollination by having at least one
//     pollinating neighbor, and every other need by the current weather
//     carrying the matching tag.
//   - magical influence: the tier's base influence, plus a share of the
//     garden-wide magic level for species that need magic, times the
//     resonance multiplier when the plant completes a geometric pattern.
//   - moonlight effect: `moon strength * moonlight need / 10`, for species
//     that need moonlight.
//
// Growth goes up on a positive delta and down otherwise. Cell magic gains
// half the influence, cell water follows the weather. A mature plant then
// gets evolution/spread handling; an immature plant at zero health withers.
//
// Neighbor-dependent inputs (pollinators, resonance patterns) are read from
// a copy of the grid taken at the start of the tick, so the outcome does not
// depend on which plants were updated or removed earlier in the scan.
// Plants placed by automatic spread wait until the next tick.
//
// See also: `sim.rs` for the tick driver, `breeding.rs` for `auto_spread()`.

use crate::breeding;
use crate::catalog::{PlantCatalog, PlantSpecies};
use crate::config::{GameConfig, NeedScores, SpreadPolicy, WeatherProfile};
use crate::event::{SimEvent, SimEventKind};
use crate::grid::{GardenGrid, PlantInstance};
use crate::sim::SimState;
use crate::types::{GridCoord, NeedKind, PATTERN_OFFSETS, PlantTrait, Rarity, Severity, Species};
use enchanted_garden_prng::RandomSource;
use tracing::debug;

/// Sum of met/unmet contributions over the species' declared needs.
pub fn environmental_score(
    data: &PlantSpecies,
    plant: &PlantInstance,
    weather: &WeatherProfile,
    pollinators: u32,
    scores: &NeedScores,
) -> f32 {
    data.needs
        .declared()
        .map(|(kind, level)| {
            let met = match kind {
                NeedKind::Water => plant.water >= level,
                NeedKind::Pollination => pollinators > 0,
                _ => kind.weather_tag().is_some_and(|tag| weather.has_tag(tag)),
            };
            let score = scores.get(kind);
            if met { score.met } else { score.unmet }
        })
        .sum()
}

pub fn magical_influence(
    data: &PlantSpecies,
    magic_level: f32,
    resonating: bool,
    config: &GameConfig,
) -> f32 {
    let mut influence = config.rarity(data.rarity).base_influence;
    if data.needs.magic.is_some() {
        influence += magic_level / 100.0 * config.magic.ambient_need_scale;
    }
    if resonating {
        influence *= config.magic.resonance_multiplier;
    }
    influence
}

pub fn moonlight_effect(data: &PlantSpecies, moon_strength: f32) -> f32 {
    data.needs
        .moonlight
        .map_or(0.0, |need| moon_strength * (need / 10.0))
}

/// Whether at least `min_matches` of the forward pattern offsets hold the
/// same species as `coord`.
pub fn forms_pattern(grid: &GardenGrid, coord: GridCoord, species: Species, min_matches: u32) -> bool {
    let matches = PATTERN_OFFSETS
        .iter()
        .map(|&(dx, dy)| coord.offset(dx, dy))
        .filter(|&c| grid.in_bounds(c) && grid.species_at(c) == Some(species))
        .count();
    matches as u32 >= min_matches
}

/// Occupied neighbors whose species attracts pollinators.
pub fn pollinator_count(grid: &GardenGrid, catalog: &PlantCatalog, coord: GridCoord) -> u32 {
    grid.occupied_neighbors(coord)
        .into_iter()
        .filter_map(|c| grid.species_at(c))
        .filter(|&s| catalog.get(s).effect(PlantTrait::AttractPollinators) > 0.0)
        .count() as u32
}

/// What one plant's update decided.
struct CellOutcome {
    resonating: bool,
    mature: bool,
    dead: bool,
}

impl<R: RandomSource> SimState<R> {
    /// Update every plant alive at the start of the tick, then refresh the
    /// garden-wide aggregates.
    pub(crate) fn simulate_ecosystem(&mut self, events: &mut Vec<SimEvent>) {
        let before = self.grid.clone();
        let weather = self.config.weather(self.weather.current).clone();
        let moon_strength = self.moon.strength();

        for coord in before.occupied_coords() {
            let Some(outcome) = self.update_plant(&before, coord, &weather, moon_strength) else {
                continue;
            };
            if outcome.resonating {
                debug!(%coord, "magical resonance");
                self.emit(events, SimEventKind::ResonanceDetected { coord });
                self.notify(
                    format!("✨ Magical resonance detected at square {coord}!"),
                    Severity::Magic,
                    events,
                );
            }
            if outcome.mature {
                self.handle_mature_plant(coord, events);
            } else if outcome.dead {
                self.wither(coord, events);
            }
        }

        self.update_aggregates();
    }

    fn update_plant(
        &mut self,
        before: &GardenGrid,
        coord: GridCoord,
        weather: &WeatherProfile,
        moon_strength: f32,
    ) -> Option<CellOutcome> {
        let plant = self.grid.get(coord)?;
        let species = plant.species;
        let data = self.catalog.get(species);

        let pollinators = pollinator_count(before, &self.catalog, coord);
        let resonating = forms_pattern(
            before,
            coord,
            species,
            self.config.magic.resonance_min_matches,
        );
        let env = environmental_score(data, plant, weather, pollinators, &self.config.needs);
        let influence = magical_influence(data, self.magic_level, resonating, &self.config);
        let moon = moonlight_effect(data, moon_strength);
        let delta = env + influence + moon;

        let params = &self.config.plant;
        let max = params.stat_max;
        let gain = influence * self.config.magic.cell_magic_gain_factor;
        let plant = self.grid.get_mut(coord)?;
        plant.pollinators = pollinators;
        plant.health = (plant.health + delta).clamp(0.0, max);
        plant.growth = if delta > 0.0 {
            plant.growth + params.growth_step
        } else {
            (plant.growth - params.growth_decay).max(0.0)
        };
        plant.magic = (plant.magic + gain).clamp(0.0, max);
        plant.water = (plant.water + weather.water_delta).clamp(0.0, max);

        Some(CellOutcome {
            resonating,
            mature: plant.growth >= params.mature_growth,
            dead: plant.health <= 0.0,
        })
    }

    /// Evolution and (under `AutoSpread`) automatic cross-pollination for a
    /// mature plant. Skipped entirely while the plant's spread cooldown runs.
    pub(crate) fn handle_mature_plant(&mut self, coord: GridCoord, events: &mut Vec<SimEvent>) {
        let now = self.now_ms;
        let Some(plant) = self.grid.get(coord) else {
            return;
        };
        let cooldown = self.config.spread.cooldown_ms;
        if plant
            .last_spread_ms
            .is_some_and(|last| now.saturating_sub(last) < cooldown)
        {
            return;
        }

        let species = plant.species;
        let magic = plant.magic;
        let data = self.catalog.get(species);
        let rarity = data.rarity;
        let name = data.name.clone();
        let base_magic_trait = data.effect(PlantTrait::Magic);

        let evolution = &self.config.evolution;
        let bonus = evolution.magic_trait_bonus;
        if magic >= evolution.magic_threshold && self.rng.chance(evolution.chance) {
            let mature_growth = self.config.plant.mature_growth;
            if let Some(plant) = self.grid.get_mut(coord) {
                plant.growth = mature_growth;
                plant.evolved = true;
                plant.magical = true;
                plant.effects.insert(PlantTrait::Magic, base_magic_trait + bonus);
            }
            debug!(%coord, %species, "plant evolved");
            self.emit(events, SimEventKind::PlantEvolved { coord, species });
            self.notify(
                format!("🌟 Magical evolution occurred for {name}!"),
                Severity::Magic,
                events,
            );
        }

        let spread = &self.config.spread;
        if spread.policy != SpreadPolicy::AutoSpread || !self.rng.chance(spread.chance) {
            return;
        }
        if let Some(plant) = self.grid.get_mut(coord) {
            plant.last_spread_ms = Some(now);
        }

        let empty = self.grid.empty_neighbors(coord);
        let spread_to = match self.rng.pick(&empty).copied() {
            Some(target) => {
                breeding::auto_spread(&mut self.grid, &self.catalog, coord, &mut self.rng)
                    .map(|outcome| (target, outcome))
            }
            None => None,
        };

        match spread_to {
            Some((target, outcome)) => {
                let tier = self.catalog.get(outcome.offspring).rarity;
                self.score += self.config.rarity(tier).score;
                self.announce_breeding([coord, outcome.partner], outcome.offspring, target, true, events);
            }
            None if rarity >= Rarity::Rare => {
                self.score += self.config.spread.failed_spread_score;
            }
            None => {}
        }
    }

    /// Remove a dead plant.
    pub(crate) fn wither(&mut self, coord: GridCoord, events: &mut Vec<SimEvent>) {
        let Some(plant) = self.grid.take(coord) else {
            return;
        };
        let data = self.catalog.get(plant.species);
        let was_legendary = data.rarity == Rarity::Legendary;
        let name = data.name.clone();
        debug!(%coord, species = %plant.species, was_legendary, "plant withered");
        self.emit(
            events,
            SimEventKind::PlantWithered {
                coord,
                species: plant.species,
                was_legendary,
            },
        );
        if was_legendary {
            self.notify(
                format!("💔 A legendary {name} has withered away..."),
                Severity::Error,
                events,
            );
        } else {
            self.notify(format!("A {name} has withered..."), Severity::Warning, events);
        }
    }

    fn update_aggregates(&mut self) {
        let mut total_magic = 0.0;
        let mut total_health = 0.0;
        let mut pollinators = 0;
        let mut count = 0usize;
        for (_, plant) in self.grid.plants() {
            total_magic += plant.magic;
            total_health += plant.health;
            pollinators += plant.pollinators;
            count += 1;
        }
        let max = self.config.plant.stat_max;
        self.magic_level = (total_magic / self.grid.cell_count() as f32).min(max);
        self.ecosystem_health = if count == 0 {
            max
        } else {
            (total_health / count as f32).min(max)
        };
        self.pollinators = pollinators;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::SimAction;
    use crate::types::{EnvTag, WeatherKind};
    use enchanted_garden_prng::ScriptedRng;

    fn sprout(species: Species) -> PlantInstance {
        let catalog = PlantCatalog::default();
        PlantInstance::sprout(species, catalog.get(species), &GameConfig::default())
    }

    fn grid_with(plants: &[(i32, i32, Species)]) -> GardenGrid {
        let mut grid = GardenGrid::new(20, 15);
        for &(x, y, species) in plants {
            grid.place(GridCoord::new(x, y), sprout(species));
        }
        grid
    }

    #[test]
    fn environmental_score_rose_in_sun() {
        let catalog = PlantCatalog::default();
        let config = GameConfig::default();
        let rose = catalog.get(Species::Rose);
        let sunny = config.weather(WeatherKind::Sunny);
        let plant = sprout(Species::Rose);
        // water 10 >= 7: +2, sunlight: +2, no pollinators: -1.
        assert_eq!(environmental_score(rose, &plant, sunny, 0, &config.needs), 3.0);
        assert_eq!(environmental_score(rose, &plant, sunny, 2, &config.needs), 5.0);
        let rainy = config.weather(WeatherKind::Rainy);
        assert_eq!(environmental_score(rose, &plant, rainy, 0, &config.needs), 0.0);
    }

    #[test]
    fn undeclared_needs_contribute_nothing() {
        let catalog = PlantCatalog::default();
        let config = GameConfig::default();
        let mut profile = config.weather(WeatherKind::Sunny).clone();
        profile.tags.clear();
        profile.tags.insert(EnvTag::Heat);
        // Thistle needs water, sunlight, pollination; heat is irrelevant.
        let thistle = catalog.get(Species::Thistle);
        let plant = sprout(Species::Thistle);
        assert_eq!(environmental_score(thistle, &plant, &profile, 0, &config.needs), 0.0);
    }

    #[test]
    fn magical_influence_by_tier_and_magic_need() {
        let catalog = PlantCatalog::default();
        let config = GameConfig::default();
        assert_eq!(magical_influence(catalog.get(Species::Rose), 80.0, false, &config), 0.5);
        assert_eq!(magical_influence(catalog.get(Species::Rose), 0.0, true, &config), 0.75);
        // Moonflower is rare and needs magic: 1 + 0.5 * 2.
        assert_eq!(magical_influence(catalog.get(Species::Moonflower), 50.0, false, &config), 2.0);
        assert_eq!(magical_influence(catalog.get(Species::Moonflower), 50.0, true, &config), 3.0);
    }

    #[test]
    fn moonlight_effect_only_for_moonlight_needs() {
        let catalog = PlantCatalog::default();
        assert_eq!(moonlight_effect(catalog.get(Species::Rose), 2.0), 0.0);
        assert_eq!(moonlight_effect(catalog.get(Species::Starbloom), 2.0), 2.0);
        assert_eq!(moonlight_effect(catalog.get(Species::Starbloom), 0.0), 0.0);
    }

    #[test]
    fn pattern_needs_three_forward_matches() {
        let origin = GridCoord::new(5, 5);
        let grid = grid_with(&[
            (5, 5, Species::Sage),
            (6, 5, Species::Sage),
            (5, 6, Species::Sage),
            (6, 6, Species::Sage),
        ]);
        assert!(forms_pattern(&grid, origin, Species::Sage, 3));
        assert!(!forms_pattern(&grid, GridCoord::new(6, 5), Species::Sage, 3));

        let two = grid_with(&[(5, 5, Species::Sage), (6, 5, Species::Sage), (5, 6, Species::Sage)]);
        assert!(!forms_pattern(&two, origin, Species::Sage, 3));
    }

    #[test]
    fn pollinators_come_from_attracting_neighbors() {
        let catalog = PlantCatalog::default();
        let grid = grid_with(&[
            (5, 5, Species::Rose),
            (6, 5, Species::Sunflower),
            (4, 4, Species::Sunflower),
            (4, 5, Species::Sage),
        ]);
        assert_eq!(pollinator_count(&grid, &catalog, GridCoord::new(5, 5)), 2);
        assert_eq!(pollinator_count(&grid, &catalog, GridCoord::new(4, 5)), 1);
    }

    #[test]
    fn tick_updates_rose_stats() {
        let mut sim = SimState::new(5);
        sim.apply(&SimAction::Plant {
            coord: GridCoord::new(0, 0),
            species: Species::Rose,
        });
        sim.advance_to(1000);
        let rose = sim.grid.get(GridCoord::new(0, 0)).unwrap();
        // Sunny: env 3 + influence 0.5, moon 0.
        assert_eq!(rose.health, 100.0);
        assert!((rose.growth - 1.15).abs() < 1e-6);
        assert_eq!(rose.magic, 10.25);
        assert_eq!(rose.water, 8.0);
        assert!((sim.magic_level - 10.25 / 300.0).abs() < 1e-6);
        assert_eq!(sim.ecosystem_health, 100.0);
    }

    #[test]
    fn starving_plant_withers() {
        let mut sim = SimState::new(5);
        sim.apply(&SimAction::Plant {
            coord: GridCoord::new(2, 2),
            species: Species::Moonflower,
        });
        {
            let plant = sim.grid.get_mut(GridCoord::new(2, 2)).unwrap();
            plant.health = 0.5;
            plant.water = 0.0;
        }
        // Sunny, moon phase 0: water -1, moonlight -1 + moon 0.9, magic -0.5,
        // influence 1.0 + tiny ambient share. Net below -0.5.
        let events = sim.advance_to(1000);
        assert!(sim.grid.is_empty(GridCoord::new(2, 2)));
        assert!(events.iter().any(|e| e.kind
            == SimEventKind::PlantWithered {
                coord: GridCoord::new(2, 2),
                species: Species::Moonflower,
                was_legendary: false,
            }));
        assert_eq!(sim.active_notification.as_ref().unwrap().severity, Severity::Warning);
    }

    #[test]
    fn legendary_wither_raises_error_notice() {
        let mut sim = SimState::new(5);
        let coord = GridCoord::new(2, 2);
        // No legendary seeds at start; place it the way breeding does.
        let mut events = Vec::new();
        sim.place_plant(coord, Species::CrystalLotus, &mut events);
        events.clear();
        sim.wither(coord, &mut events);

        assert!(sim.grid.is_empty(coord));
        assert!(events.iter().any(|e| e.kind
            == SimEventKind::PlantWithered {
                coord,
                species: Species::CrystalLotus,
                was_legendary: true,
            }));
        let notice = sim.active_notification.as_ref().unwrap();
        assert_eq!(notice.severity, Severity::Error);
        assert_eq!(notice.message, "💔 A legendary Crystal Lotus has withered away...");

        // Withering an empty cell is a no-op.
        let mut again = Vec::new();
        sim.wither(coord, &mut again);
        assert!(again.is_empty());
    }

    #[test]
    fn resonance_fires_once_for_pattern_origin() {
        let mut sim = SimState::new(5);
        for (x, y) in [(5, 5), (6, 5), (5, 6), (6, 6)] {
            sim.apply(&SimAction::Plant {
                coord: GridCoord::new(x, y),
                species: Species::Sage,
            });
        }
        let events = sim.advance_to(1000);
        let resonances: Vec<_> = events
            .iter()
            .filter_map(|e| match e.kind {
                SimEventKind::ResonanceDetected { coord } => Some(coord),
                _ => None,
            })
            .collect();
        assert_eq!(resonances, vec![GridCoord::new(5, 5)]);
        // Sage is common: 0.5 * 1.5 influence, half of it to cell magic.
        let origin = sim.grid.get(GridCoord::new(5, 5)).unwrap();
        assert_eq!(origin.magic, 10.375);
        assert_eq!(sim.grid.get(GridCoord::new(6, 5)).unwrap().magic, 10.25);
    }

    #[test]
    fn mature_plant_evolves_with_high_magic() {
        let mut config = GameConfig::default();
        config.spread.policy = SpreadPolicy::EvolveOnly;
        let rng = ScriptedRng::new([0.05]);
        let mut sim = SimState::with_rng(rng, config, PlantCatalog::default());
        let coord = GridCoord::new(3, 3);
        let mut plant = sprout(Species::Rose);
        plant.growth = 4.0;
        plant.magic = 95.0;
        sim.grid.place(coord, plant);

        let mut events = Vec::new();
        sim.handle_mature_plant(coord, &mut events);
        let plant = sim.grid.get(coord).unwrap();
        assert!(plant.evolved && plant.magical);
        assert_eq!(plant.effects[&PlantTrait::Magic], 2.0);
        assert!(events.iter().any(|e| matches!(e.kind, SimEventKind::PlantEvolved { .. })));
    }

    #[test]
    fn auto_spread_places_offspring_and_scores() {
        // Magic is below the evolution threshold, so no evolution roll.
        let rng = ScriptedRng::new([
            0.1,                         // spread chance (0.30)
            0.0,                         // empty-neighbor pick: first empty cell
            0.1,                         // Sunflower pollination chance (0.5)
            0.0,                         // partner pick: the only unlike neighbor
            ScriptedRng::index_of(2, 4), // offspring: SAGE
            0.0,
        ]);
        let mut sim = SimState::with_rng(rng, GameConfig::default(), PlantCatalog::default());
        let source = GridCoord::new(5, 5);
        let mut mature = sprout(Species::Sunflower);
        mature.growth = 4.0;
        sim.grid.place(source, mature);
        sim.grid.place(GridCoord::new(6, 5), sprout(Species::Sage));
        sim.now_ms = 20_000;

        let mut events = Vec::new();
        sim.handle_mature_plant(source, &mut events);

        assert_eq!(sim.grid.species_at(GridCoord::new(4, 4)), Some(Species::Sage));
        assert_eq!(sim.score, 10);
        let plant = sim.grid.get(source).unwrap();
        assert!(plant.has_cross_pollinated);
        assert_eq!(plant.last_spread_ms, Some(20_000));
        assert!(events.iter().any(|e| matches!(
            e.kind,
            SimEventKind::PlantBred {
                automatic: true,
                offspring: Species::Sage,
                ..
            }
        )));

        // Cooldown: nothing happens (and nothing is drawn) for ten seconds.
        let drawn_before = sim.rng.remaining();
        assert_eq!(drawn_before, 1);
        sim.now_ms = 29_999;
        sim.handle_mature_plant(source, &mut events);
        assert_eq!(sim.rng.remaining(), drawn_before);
    }

    #[test]
    fn failed_spread_of_rare_plant_still_scores() {
        let rng = ScriptedRng::new([0.1, 0.0]);
        let mut sim = SimState::with_rng(rng, GameConfig::default(), PlantCatalog::default());
        let source = GridCoord::new(0, 0);
        let mut mature = sprout(Species::ShadowVine);
        mature.growth = 4.0;
        sim.grid.place(source, mature);

        let mut events = Vec::new();
        sim.handle_mature_plant(source, &mut events);
        // Spread roll hits, but a lone plant has no partner.
        assert_eq!(sim.score, 5);
        assert_eq!(sim.grid.plant_count(), 1);
    }
}
