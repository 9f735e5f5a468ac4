// Read-only, serializable view of the whole garden.
//
// A `GardenSnapshot` is what the view layer (or the CLI) renders: plants with
// their display glyph, resources, weather, moon, score, achievements,
// discoveries, aggregates and the notification on screen. It owns its data so
// it can cross a channel to another thread; building one never mutates the
// sim.
//
// Plants are listed row-major, and every collection inside is ordered, so
// two sims in the same state serialize to identical JSON.

use crate::achievement::AchievementEntry;
use crate::economy::ResourcePool;
use crate::sim::{ActiveNotification, SimState};
use crate::types::{GridCoord, Species, WeatherKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One occupied cell as the view layer sees it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlantView {
    pub coord: GridCoord,
    pub species: Species,
    pub name: String,
    /// Glyph for the current growth stage.
    pub glyph: String,
    pub stage: usize,
    pub health: f32,
    pub growth: f32,
    pub magic: f32,
    pub water: f32,
    pub evolved: bool,
    pub magical: bool,
    pub pollinators: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GardenSnapshot {
    pub now_ms: u64,
    pub elapsed_ticks: u64,
    pub paused: bool,
    pub width: u32,
    pub height: u32,
    pub plants: Vec<PlantView>,
    pub resources: ResourcePool,
    pub weather: WeatherKind,
    pub weather_icon: String,
    pub moon_phase: u32,
    pub moon_strength: f32,
    pub score: u64,
    pub achievements: Vec<AchievementEntry>,
    pub rare_plants_seen: BTreeSet<Species>,
    pub combos_discovered: BTreeSet<String>,
    pub magic_level: f32,
    pub ecosystem_health: f32,
    pub pollinators: u32,
    pub active_notification: Option<ActiveNotification>,
    pub pending_selection: Option<GridCoord>,
}

impl GardenSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn plant_at(&self, coord: GridCoord) -> Option<&PlantView> {
        self.plants.iter().find(|p| p.coord == coord)
    }
}

impl<R> SimState<R> {
    /// Capture the current garden for display.
    pub fn snapshot(&self) -> GardenSnapshot {
        let plants = self
            .grid
            .plants()
            .map(|(coord, plant)| {
                let data = self.catalog.get(plant.species);
                let stage = plant.growth_stage();
                PlantView {
                    coord,
                    species: plant.species,
                    name: data.name.clone(),
                    glyph: data.growth_stages[stage].clone(),
                    stage,
                    health: plant.health,
                    growth: plant.growth,
                    magic: plant.magic,
                    water: plant.water,
                    evolved: plant.evolved,
                    magical: plant.magical,
                    pollinators: plant.pollinators,
                }
            })
            .collect();

        GardenSnapshot {
            now_ms: self.now_ms,
            elapsed_ticks: self.elapsed_ticks,
            paused: self.paused,
            width: self.grid.width(),
            height: self.grid.height(),
            plants,
            resources: self.resources.clone(),
            weather: self.weather.current,
            weather_icon: self.config.weather(self.weather.current).icon.clone(),
            moon_phase: self.moon.phase,
            moon_strength: self.moon.strength(),
            score: self.score,
            achievements: self.achievements.entries().to_vec(),
            rare_plants_seen: self.discoveries.rare_plants_seen.clone(),
            combos_discovered: self.discoveries.combos_discovered.clone(),
            magic_level: self.magic_level,
            ecosystem_health: self.ecosystem_health,
            pollinators: self.pollinators,
            active_notification: self.active_notification.clone(),
            pending_selection: self.pending_selection,
        }
    }
}
