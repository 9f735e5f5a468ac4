// Data-driven game configuration.
//
// All tunable simulation parameters live here in `GameConfig`, loaded from
// JSON at startup. The sim never uses magic numbers; it reads from the
// config. Every field has a default (the classic garden balance), so a
// config file only needs to name the values it overrides.
//
// Parameters are grouped into nested structs: `PlantParams` (lifecycle),
// `NeedScores` (environmental scoring), `MagicParams` (influence and
// resonance), `EvolutionParams`, `SpreadParams`, `EconomyParams`,
// `AchievementParams` and `NotificationParams`. Per-tier and per-weather
// tables are `BTreeMap`s keyed by `Rarity` and `WeatherKind`.
//
// See also: `sim.rs` which owns the `GameConfig` as part of `SimState`,
// `catalog.rs` for per-species data (needs, effects, offspring).
//
// **Critical constraint: determinism.** Config values feed directly into
// simulation logic. Two runs with the same seed and config are identical.

use crate::types::{EnvTag, NeedKind, Rarity, WeatherKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Errors raised while loading or validating a config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config field {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn check_probability(field: &'static str, p: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(invalid(field, format!("{p} is outside [0, 1]")))
    }
}

// ---------------------------------------------------------------------------
// Spread policy
// ---------------------------------------------------------------------------

/// What a mature plant does once its growth reaches the mature threshold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadPolicy {
    /// Evolution only. Breeding happens through the cross-pollination
    /// command alone.
    EvolveOnly,
    /// Evolution plus a chance of automatic cross-pollination into an empty
    /// neighbor.
    #[default]
    AutoSpread,
}

// ---------------------------------------------------------------------------
// Parameter groups
// ---------------------------------------------------------------------------

/// Plant lifecycle parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantParams {
    pub initial_health: f32,
    pub initial_growth: f32,
    pub initial_water: f32,
    /// Growth gained on a tick whose combined health delta is positive.
    pub growth_step: f32,
    /// Growth lost on any other tick. Growth floors at zero.
    pub growth_decay: f32,
    /// Growth at which a plant is mature and enters evolution/spread
    /// handling instead of the wither check.
    pub mature_growth: f32,
    /// Upper clamp for health, cell water and cell magic.
    pub stat_max: f32,
}

impl Default for PlantParams {
    fn default() -> Self {
        Self {
            initial_health: 100.0,
            initial_growth: 1.0,
            initial_water: 10.0,
            growth_step: 0.15,
            growth_decay: 0.08,
            mature_growth: 4.0,
            stat_max: 100.0,
        }
    }
}

/// Score contribution of one declared need: `met` when the condition holds,
/// `unmet` (a penalty, usually negative) otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NeedScore {
    pub met: f32,
    pub unmet: f32,
}

/// Per-need scoring table for the environmental score.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NeedScores {
    pub scores: BTreeMap<NeedKind, NeedScore>,
}

impl NeedScores {
    pub fn get(&self, kind: NeedKind) -> NeedScore {
        self.scores
            .get(&kind)
            .copied()
            .unwrap_or(NeedScore { met: 0.0, unmet: 0.0 })
    }
}

impl Default for NeedScores {
    fn default() -> Self {
        let score = |met, unmet| NeedScore { met, unmet };
        let scores = BTreeMap::from([
            (NeedKind::Water, score(2.0, -1.0)),
            (NeedKind::Sunlight, score(2.0, -1.0)),
            (NeedKind::Moonlight, score(2.0, -1.0)),
            (NeedKind::Heat, score(2.0, -1.0)),
            (NeedKind::Harmony, score(1.0, -0.5)),
            (NeedKind::Pollination, score(1.0, -1.0)),
            (NeedKind::Magic, score(1.5, -0.5)),
        ]);
        Self { scores }
    }
}

/// Magical influence and geometric resonance.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MagicParams {
    /// Species that need magic gain `(magic_level / 100) * this`.
    pub ambient_need_scale: f32,
    /// Multiplier applied to the whole influence of a resonating cell.
    pub resonance_multiplier: f32,
    /// How many of the four forward pattern offsets must share the cell's
    /// species for it to resonate.
    pub resonance_min_matches: u32,
    /// Fraction of a cell's influence added to its own magic each tick.
    pub cell_magic_gain_factor: f32,
    /// Length of the moon cycle in ticks.
    pub moon_cycle_length: u32,
}

impl Default for MagicParams {
    fn default() -> Self {
        Self {
            ambient_need_scale: 2.0,
            resonance_multiplier: 1.5,
            resonance_min_matches: 3,
            cell_magic_gain_factor: 0.5,
            moon_cycle_length: 30,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionParams {
    /// Minimum cell magic for an evolution roll.
    pub magic_threshold: f32,
    pub chance: f32,
    /// Added to the instance's `magic` trait on evolution.
    pub magic_trait_bonus: f32,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            magic_threshold: 90.0,
            chance: 0.10,
            magic_trait_bonus: 2.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadParams {
    pub policy: SpreadPolicy,
    /// Chance per mature tick of attempting an automatic spread.
    pub chance: f32,
    /// Minimum time between evolution/spread handling for one plant.
    pub cooldown_ms: u64,
    /// Score awarded to a rare-or-better plant whose spread attempt found
    /// no partner or no room.
    pub failed_spread_score: u64,
}

impl Default for SpreadParams {
    fn default() -> Self {
        Self {
            policy: SpreadPolicy::AutoSpread,
            chance: 0.30,
            cooldown_ms: 10_000,
            failed_spread_score: 5,
        }
    }
}

/// Resource pool balance: starting stock, regeneration and action costs.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyParams {
    pub initial_water: f32,
    pub initial_magic: f32,
    pub pool_max: f32,
    pub water_regen: f32,
    /// Replaces `water_regen` while it rains.
    pub rainy_water_regen: f32,
    pub magic_regen: f32,
    /// Replaces `magic_regen` during magical mist.
    pub misty_magic_regen: f32,
    /// Pool water spent per WATER command.
    pub water_cost: f32,
    /// Cell water gained per WATER command.
    pub water_amount: f32,
    /// Pool magic spent per manual cross-pollination.
    pub breeding_magic_cost: f32,
}

impl Default for EconomyParams {
    fn default() -> Self {
        Self {
            initial_water: 100.0,
            initial_magic: 50.0,
            pool_max: 100.0,
            water_regen: 0.5,
            rainy_water_regen: 2.0,
            magic_regen: 0.2,
            misty_magic_regen: 2.0,
            water_cost: 10.0,
            water_amount: 20.0,
            breeding_magic_cost: 10.0,
        }
    }
}

/// Per-tier balance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RarityParams {
    /// Base magical influence of a plant of this tier.
    pub base_influence: f32,
    /// Cell magic a new plant of this tier starts with.
    pub initial_magic: f32,
    /// Score for planting, breeding or first discovering this tier.
    pub score: u64,
    /// Chance per tick that one seed of this tier regenerates.
    pub seed_regen_chance: f32,
    pub seed_cap: u32,
    pub initial_seeds: u32,
}

/// A weather type's effect on the garden.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherProfile {
    pub icon: String,
    /// Added to every occupied cell's water each tick (may be negative).
    pub water_delta: f32,
    pub growth_multiplier: f32,
    pub tags: BTreeSet<EnvTag>,
}

impl WeatherProfile {
    pub fn has_tag(&self, tag: EnvTag) -> bool {
        self.tags.contains(&tag)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AchievementParams {
    pub one_minute_ticks: u64,
    pub five_minute_ticks: u64,
    pub botanist_rare_count: usize,
    pub master_score: u64,
}

impl Default for AchievementParams {
    fn default() -> Self {
        Self {
            one_minute_ticks: 60,
            five_minute_ticks: 300,
            botanist_rare_count: 5,
            master_score: 500,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationParams {
    pub dismiss_ms: u64,
    /// Dismiss delay for `Severity::Special`.
    pub special_dismiss_ms: u64,
    /// Delay between a combination's discovery banner and its flavor message.
    pub flavor_message_delay_ms: u64,
}

impl Default for NotificationParams {
    fn default() -> Self {
        Self {
            dismiss_ms: 3000,
            special_dismiss_ms: 5000,
            flavor_message_delay_ms: 1500,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level game config
// ---------------------------------------------------------------------------

/// Top-level game configuration. Loaded from JSON, never mutated at runtime.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub grid_width: u32,
    pub grid_height: u32,

    /// Milliseconds of garden time per tick.
    pub tick_interval_ms: u64,

    /// Time between weather changes.
    pub weather_change_interval_ms: u64,
    pub initial_weather: WeatherKind,

    pub plant: PlantParams,
    pub needs: NeedScores,
    pub magic: MagicParams,
    pub evolution: EvolutionParams,
    pub spread: SpreadParams,
    pub economy: EconomyParams,
    pub achievements: AchievementParams,
    pub notifications: NotificationParams,

    pub rarity: BTreeMap<Rarity, RarityParams>,
    pub weather: BTreeMap<WeatherKind, WeatherProfile>,
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every invariant the sim relies on when indexing the config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(invalid("grid_width/grid_height", "grid must be non-empty"));
        }
        if i32::try_from(self.grid_width).is_err() || i32::try_from(self.grid_height).is_err() {
            return Err(invalid("grid_width/grid_height", "grid is too large"));
        }
        if self.tick_interval_ms == 0 {
            return Err(invalid("tick_interval_ms", "must be positive"));
        }
        if self.weather_change_interval_ms == 0 {
            return Err(invalid("weather_change_interval_ms", "must be positive"));
        }
        if self.magic.moon_cycle_length == 0 {
            return Err(invalid("magic.moon_cycle_length", "must be positive"));
        }
        if self.plant.stat_max <= 0.0 {
            return Err(invalid("plant.stat_max", "must be positive"));
        }
        if self.economy.pool_max <= 0.0 {
            return Err(invalid("economy.pool_max", "must be positive"));
        }
        check_probability("evolution.chance", self.evolution.chance)?;
        check_probability("spread.chance", self.spread.chance)?;

        for tier in Rarity::ALL {
            let params = self
                .rarity
                .get(&tier)
                .ok_or_else(|| invalid("rarity", format!("missing tier {tier}")))?;
            check_probability("rarity.seed_regen_chance", params.seed_regen_chance)?;
            if params.initial_seeds > params.seed_cap {
                return Err(invalid(
                    "rarity.initial_seeds",
                    format!("{tier} starts above its cap"),
                ));
            }
        }
        for kind in WeatherKind::ALL {
            if !self.weather.contains_key(&kind) {
                return Err(invalid("weather", format!("missing weather {kind}")));
            }
        }
        Ok(())
    }

    /// Tier parameters. Validation guarantees every tier is present.
    pub fn rarity(&self, tier: Rarity) -> &RarityParams {
        &self.rarity[&tier]
    }

    /// Weather profile. Validation guarantees every kind is present.
    pub fn weather(&self, kind: WeatherKind) -> &WeatherProfile {
        &self.weather[&kind]
    }
}

fn default_rarity_table() -> BTreeMap<Rarity, RarityParams> {
    let tier = |base_influence, initial_magic, score, seed_regen_chance, seed_cap, initial_seeds| {
        RarityParams {
            base_influence,
            initial_magic,
            score,
            seed_regen_chance,
            seed_cap,
            initial_seeds,
        }
    };
    BTreeMap::from([
        (Rarity::Common, tier(0.5, 10.0, 10, 0.10, 20, 10)),
        (Rarity::Rare, tier(1.0, 20.0, 25, 0.05, 10, 3)),
        (Rarity::Epic, tier(2.0, 30.0, 50, 0.02, 5, 1)),
        (Rarity::Legendary, tier(3.0, 50.0, 100, 0.005, 2, 0)),
    ])
}

fn default_weather_table() -> BTreeMap<WeatherKind, WeatherProfile> {
    use EnvTag::*;
    let profile = |icon: &str, water_delta, growth_multiplier, tags: &[EnvTag]| WeatherProfile {
        icon: icon.into(),
        water_delta,
        growth_multiplier,
        tags: tags.iter().copied().collect(),
    };
    BTreeMap::from([
        (WeatherKind::Sunny, profile("☀️", -2.0, 1.5, &[Sunlight, Heat])),
        (WeatherKind::Rainy, profile("🌧️", 3.0, 1.2, &[Water, Harmony])),
        (WeatherKind::Storm, profile("⛈️", 4.0, 0.8, &[Magic, Energy])),
        (
            WeatherKind::MagicalMist,
            profile("✨", 1.0, 1.3, &[Magic, Mystery, Dreams]),
        ),
        (
            WeatherKind::Moonlit,
            profile("🌙", -1.0, 1.1, &[Moonlight, Dreams, Mystery]),
        ),
    ])
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 15,
            tick_interval_ms: 1000,
            weather_change_interval_ms: 180_000,
            initial_weather: WeatherKind::Sunny,
            plant: PlantParams::default(),
            needs: NeedScores::default(),
            magic: MagicParams::default(),
            evolution: EvolutionParams::default(),
            spread: SpreadParams::default(),
            economy: EconomyParams::default(),
            achievements: AchievementParams::default(),
            notifications: NotificationParams::default(),
            rarity: default_rarity_table(),
            weather: default_weather_table(),
        }
    }
}
