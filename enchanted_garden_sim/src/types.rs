// Core types shared across the garden simulation.
//
// Defines grid coordinates (`GridCoord`) and the closed enums the rest of the
// sim keys its tables on: `Species`, `Rarity`, `WeatherKind`, `NeedKind`,
// `EnvTag`, `PlantTrait`, and notification `Severity`. All types derive
// `Serialize`/`Deserialize` so snapshots, commands and config files can cross
// the view boundary as JSON, and `Ord` so they can key `BTreeMap`s.
//
// **Critical constraint: determinism.** Every enum exposes an `ALL` array in
// declaration order; iteration over species, tiers or weather always goes
// through these arrays or a `BTreeMap`, never through a hashed collection.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A cell position on the garden grid. `x` grows to the east (columns),
/// `y` grows to the south (rows).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

/// The 8-neighborhood, in the scan order used for every neighbor lookup.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Forward offsets checked for geometric resonance patterns.
pub const PATTERN_OFFSETS: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

impl GridCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// King-move distance: two distinct cells are neighbors iff this is 1.
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        (self.x - other.x)
            .unsigned_abs()
            .max((self.y - other.y).unsigned_abs())
    }

    pub fn is_adjacent_to(self, other: Self) -> bool {
        self.chebyshev_distance(other) == 1
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Plant species
// ---------------------------------------------------------------------------

/// Every plant kind the garden knows. Behavior lives in the catalog's
/// `PlantSpecies` records; this enum is only the key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Species {
    Rose,
    CrystalLotus,
    Moonflower,
    Starbloom,
    PhoenixBloom,
    DragonSnap,
    RainbowIris,
    Lavender,
    Sunflower,
    Sage,
    ShadowVine,
    Thistle,
}

impl Species {
    pub const ALL: [Species; 12] = [
        Species::Rose,
        Species::CrystalLotus,
        Species::Moonflower,
        Species::Starbloom,
        Species::PhoenixBloom,
        Species::DragonSnap,
        Species::RainbowIris,
        Species::Lavender,
        Species::Sunflower,
        Species::Sage,
        Species::ShadowVine,
        Species::Thistle,
    ];

    /// The catalog key, as used in config files and combination ids.
    pub fn key(self) -> &'static str {
        match self {
            Species::Rose => "ROSE",
            Species::CrystalLotus => "CRYSTAL_LOTUS",
            Species::Moonflower => "MOONFLOWER",
            Species::Starbloom => "STARBLOOM",
            Species::PhoenixBloom => "PHOENIX_BLOOM",
            Species::DragonSnap => "DRAGON_SNAP",
            Species::RainbowIris => "RAINBOW_IRIS",
            Species::Lavender => "LAVENDER",
            Species::Sunflower => "SUNFLOWER",
            Species::Sage => "SAGE",
            Species::ShadowVine => "SHADOW_VINE",
            Species::Thistle => "THISTLE",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Rarity tier. Ordered from most to least common, so `>= Rarity::Rare`
/// reads as "rare or better".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary];
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        })
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeatherKind {
    Sunny,
    Rainy,
    Storm,
    MagicalMist,
    Moonlit,
}

impl WeatherKind {
    pub const ALL: [WeatherKind; 5] = [
        WeatherKind::Sunny,
        WeatherKind::Rainy,
        WeatherKind::Storm,
        WeatherKind::MagicalMist,
        WeatherKind::Moonlit,
    ];
}

impl fmt::Display for WeatherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WeatherKind::Sunny => "SUNNY",
            WeatherKind::Rainy => "RAINY",
            WeatherKind::Storm => "STORM",
            WeatherKind::MagicalMist => "MAGICAL_MIST",
            WeatherKind::Moonlit => "MOONLIT",
        })
    }
}

/// Environmental effect tags a weather type provides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvTag {
    Water,
    Sunlight,
    Moonlight,
    Heat,
    Harmony,
    Magic,
    Energy,
    Mystery,
    Dreams,
}

/// The resources a species may declare a need for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeedKind {
    Water,
    Sunlight,
    Moonlight,
    Heat,
    Harmony,
    Pollination,
    Magic,
}

impl NeedKind {
    pub const ALL: [NeedKind; 7] = [
        NeedKind::Water,
        NeedKind::Sunlight,
        NeedKind::Moonlight,
        NeedKind::Heat,
        NeedKind::Harmony,
        NeedKind::Pollination,
        NeedKind::Magic,
    ];

    /// The weather tag that satisfies this need, for needs judged by weather.
    /// Water is judged by the cell's own water level and pollination by
    /// neighboring pollinators, so neither has a tag.
    pub fn weather_tag(self) -> Option<EnvTag> {
        match self {
            NeedKind::Sunlight => Some(EnvTag::Sunlight),
            NeedKind::Moonlight => Some(EnvTag::Moonlight),
            NeedKind::Heat => Some(EnvTag::Heat),
            NeedKind::Harmony => Some(EnvTag::Harmony),
            NeedKind::Magic => Some(EnvTag::Magic),
            NeedKind::Water | NeedKind::Pollination => None,
        }
    }
}

/// Named traits in a species' effects table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlantTrait {
    Harmony,
    Attraction,
    Love,
    Magic,
    Purification,
    Wisdom,
    NightBloom,
    Mystery,
    Dreams,
    Light,
    Protection,
    Rebirth,
    Warmth,
    Strength,
    Courage,
    Joy,
    Creativity,
    Healing,
    RepelPests,
    Calm,
    Energy,
    AttractPollinators,
    RepelLight,
    Resilience,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
    Magic,
    Special,
}
