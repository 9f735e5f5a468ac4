// Plant catalog: data-driven species and special combination definitions.
//
// Every behavioral difference between plants (needs, effects, rarity,
// offspring, pollination chance) is data in a `PlantSpecies` record keyed by
// `Species`. The sim has a single `PlantInstance` type and reads
// species-specific values from the catalog at runtime; there is no code
// branching per species.
//
// The catalog is validated once, at load (`from_json` / `validate`): every
// species must have a record, probabilities must be in [0, 1], need levels
// must be positive, and every special combination must name at least two
// distinct species. After that the sim indexes it freely.
//
// See also: `types.rs` for the `Species`, `PlantTrait` and `NeedKind` enums,
// `combination.rs` for discovery bookkeeping, `breeding.rs` for offspring
// pools built from `PlantSpecies::offspring`.

use crate::types::{NeedKind, PlantTrait, Rarity, Species};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Errors raised while loading or validating a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("species {0} has no catalog entry")]
    MissingSpecies(Species),

    #[error("species {species}: {reason}")]
    InvalidSpecies { species: Species, reason: String },

    #[error("special combination {id:?}: {reason}")]
    InvalidCombination { id: String, reason: String },
}

/// Required level per need. Only declared needs take part in scoring.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Needs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunlight: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moonlight: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heat: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub harmony: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pollination: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magic: Option<f32>,
}

impl Needs {
    pub fn level(&self, kind: NeedKind) -> Option<f32> {
        match kind {
            NeedKind::Water => self.water,
            NeedKind::Sunlight => self.sunlight,
            NeedKind::Moonlight => self.moonlight,
            NeedKind::Heat => self.heat,
            NeedKind::Harmony => self.harmony,
            NeedKind::Pollination => self.pollination,
            NeedKind::Magic => self.magic,
        }
    }

    /// Declared needs with their levels, in `NeedKind::ALL` order.
    pub fn declared(&self) -> impl Iterator<Item = (NeedKind, f32)> + '_ {
        NeedKind::ALL
            .into_iter()
            .filter_map(|kind| self.level(kind).map(|level| (kind, level)))
    }
}

/// Static definition of one plant kind.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlantSpecies {
    pub name: String,
    pub emoji: String,
    /// Glyphs for the four growth stages, sprout to bloom.
    pub growth_stages: [String; 4],
    pub description: String,
    pub needs: Needs,
    pub effects: BTreeMap<PlantTrait, f32>,
    #[serde(default)]
    pub companion_bonus: Vec<Species>,
    pub pollination_chance: f32,
    /// May repeat entries; breeding deduplicates.
    pub offspring: Vec<Species>,
    #[serde(default)]
    pub repels: Vec<Species>,
    pub rarity: Rarity,
}

impl PlantSpecies {
    pub fn effect(&self, trait_: PlantTrait) -> f32 {
        self.effects.get(&trait_).copied().unwrap_or(0.0)
    }

    fn validate(&self, species: Species) -> Result<(), CatalogError> {
        let invalid = |reason: String| CatalogError::InvalidSpecies { species, reason };
        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".into()));
        }
        if !(0.0..=1.0).contains(&self.pollination_chance) {
            return Err(invalid(format!(
                "pollination_chance {} is outside [0, 1]",
                self.pollination_chance
            )));
        }
        for (kind, level) in self.needs.declared() {
            if !level.is_finite() || level <= 0.0 {
                return Err(invalid(format!("need {kind:?} has non-positive level {level}")));
            }
        }
        if let Some((trait_, magnitude)) = self.effects.iter().find(|(_, m)| !m.is_finite()) {
            return Err(invalid(format!("effect {trait_:?} has magnitude {magnitude}")));
        }
        Ok(())
    }
}

/// A named set of species that unlocks a one-time discovery when grown
/// side by side.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpecialCombination {
    pub id: String,
    pub plants: Vec<Species>,
    pub message: String,
    pub achievement: String,
}

impl SpecialCombination {
    pub fn required(&self) -> BTreeSet<Species> {
        self.plants.iter().copied().collect()
    }
}

/// The validated species table plus special combinations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlantCatalog {
    species: BTreeMap<Species, PlantSpecies>,
    combinations: Vec<SpecialCombination>,
}

impl PlantCatalog {
    /// Build and validate a catalog.
    pub fn new(
        species: BTreeMap<Species, PlantSpecies>,
        combinations: Vec<SpecialCombination>,
    ) -> Result<Self, CatalogError> {
        let catalog = Self {
            species,
            combinations,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        for species in Species::ALL {
            let data = self
                .species
                .get(&species)
                .ok_or(CatalogError::MissingSpecies(species))?;
            data.validate(species)?;
        }

        let mut seen_ids = BTreeSet::new();
        for combo in &self.combinations {
            let invalid = |reason: &str| CatalogError::InvalidCombination {
                id: combo.id.clone(),
                reason: reason.into(),
            };
            if combo.id.is_empty() {
                return Err(invalid("id is empty"));
            }
            if !seen_ids.insert(combo.id.as_str()) {
                return Err(invalid("duplicate id"));
            }
            if combo.required().len() < 2 {
                return Err(invalid("needs at least two distinct species"));
            }
        }
        Ok(())
    }

    /// Species record. Validation guarantees every `Species` is present.
    pub fn get(&self, species: Species) -> &PlantSpecies {
        &self.species[&species]
    }

    pub fn species(&self) -> impl Iterator<Item = (Species, &PlantSpecies)> {
        self.species.iter().map(|(k, v)| (*k, v))
    }

    pub fn combinations(&self) -> &[SpecialCombination] {
        &self.combinations
    }
}

impl Default for PlantCatalog {
    /// The built-in garden: twelve species and fifteen combinations.
    fn default() -> Self {
        Self {
            species: builtin_species(),
            combinations: builtin_combinations(),
        }
    }
}

fn stages(glyphs: [&str; 4]) -> [String; 4] {
    glyphs.map(String::from)
}

fn effects(pairs: &[(PlantTrait, f32)]) -> BTreeMap<PlantTrait, f32> {
    pairs.iter().copied().collect()
}

fn builtin_species() -> BTreeMap<Species, PlantSpecies> {
    use PlantTrait as T;
    use Species as S;

    let mut table = BTreeMap::new();
    table.insert(
        S::Rose,
        PlantSpecies {
            name: "Rose".into(),
            emoji: "🌹".into(),
            growth_stages: stages(["🌱", "🌿", "🥀", "🌹"]),
            description: "A classic symbol of love".into(),
            needs: Needs {
                water: Some(7.0),
                sunlight: Some(8.0),
                pollination: Some(6.0),
                ..Needs::default()
            },
            effects: effects(&[(T::Harmony, 3.0), (T::Attraction, 4.0), (T::Love, 5.0)]),
            companion_bonus: vec![S::Moonflower, S::CrystalLotus],
            pollination_chance: 0.4,
            offspring: vec![S::RainbowIris, S::Rose],
            repels: vec![S::Thistle],
            rarity: Rarity::Common,
        },
    );
    table.insert(
        S::CrystalLotus,
        PlantSpecies {
            name: "Crystal Lotus".into(),
            emoji: "❇️".into(),
            growth_stages: stages(["🌱", "✨", "❇️", "💠"]),
            description: "Rare flower that blooms under moonlight".into(),
            needs: Needs {
                water: Some(9.0),
                sunlight: Some(10.0),
                moonlight: Some(8.0),
                ..Needs::default()
            },
            effects: effects(&[(T::Magic, 5.0), (T::Purification, 4.0), (T::Wisdom, 3.0)]),
            companion_bonus: vec![S::Moonflower, S::Starbloom],
            pollination_chance: 0.3,
            offspring: vec![S::Starbloom, S::CrystalLotus],
            repels: vec![S::ShadowVine],
            rarity: Rarity::Legendary,
        },
    );
    table.insert(
        S::Moonflower,
        PlantSpecies {
            name: "Moonflower".into(),
            emoji: "🌙".into(),
            growth_stages: stages(["🌱", "🌿", "🌑", "🌙"]),
            description: "Blooms under moonlight".into(),
            needs: Needs {
                moonlight: Some(9.0),
                water: Some(6.0),
                magic: Some(7.0),
                ..Needs::default()
            },
            effects: effects(&[(T::NightBloom, 4.0), (T::Mystery, 3.0), (T::Dreams, 5.0)]),
            companion_bonus: vec![S::Starbloom, S::ShadowVine],
            pollination_chance: 0.45,
            offspring: vec![S::Rose, S::Moonflower],
            repels: Vec::new(),
            rarity: Rarity::Rare,
        },
    );
    table.insert(
        S::Starbloom,
        PlantSpecies {
            name: "Starbloom".into(),
            emoji: "⭐".into(),
            growth_stages: stages(["🌱", "✨", "⚡", "⭐"]),
            description: "Glows with celestial energy".into(),
            needs: Needs {
                moonlight: Some(10.0),
                harmony: Some(7.0),
                magic: Some(6.0),
                ..Needs::default()
            },
            effects: effects(&[(T::Light, 5.0), (T::Dreams, 4.0), (T::Protection, 3.0)]),
            companion_bonus: vec![S::CrystalLotus, S::Moonflower],
            pollination_chance: 0.35,
            offspring: vec![S::PhoenixBloom, S::Starbloom],
            repels: Vec::new(),
            rarity: Rarity::Epic,
        },
    );
    table.insert(
        S::PhoenixBloom,
        PlantSpecies {
            name: "Phoenix Bloom".into(),
            emoji: "🔥".into(),
            growth_stages: stages(["🌱", "🔥", "✨", "🌺"]),
            description: "Reborn from its own ashes".into(),
            needs: Needs {
                sunlight: Some(10.0),
                heat: Some(8.0),
                magic: Some(7.0),
                ..Needs::default()
            },
            effects: effects(&[(T::Rebirth, 5.0), (T::Warmth, 4.0), (T::Protection, 3.0)]),
            companion_bonus: vec![S::DragonSnap, S::Sunflower],
            pollination_chance: 0.3,
            offspring: vec![S::PhoenixBloom, S::DragonSnap],
            repels: Vec::new(),
            rarity: Rarity::Legendary,
        },
    );
    table.insert(
        S::DragonSnap,
        PlantSpecies {
            name: "Dragon Snap".into(),
            emoji: "🐲".into(),
            growth_stages: stages(["🌱", "🦎", "🐉", "🐲"]),
            description: "Breathes tiny flames".into(),
            needs: Needs {
                heat: Some(9.0),
                magic: Some(8.0),
                moonlight: Some(6.0),
                ..Needs::default()
            },
            effects: effects(&[(T::Strength, 4.0), (T::Protection, 5.0), (T::Courage, 3.0)]),
            companion_bonus: vec![S::PhoenixBloom, S::CrystalLotus],
            pollination_chance: 0.25,
            offspring: vec![S::DragonSnap, S::CrystalLotus],
            repels: Vec::new(),
            rarity: Rarity::Epic,
        },
    );
    table.insert(
        S::RainbowIris,
        PlantSpecies {
            name: "Rainbow Iris".into(),
            emoji: "🌈".into(),
            growth_stages: stages(["🌱", "🌿", "🎨", "🌈"]),
            description: "Changes colors with mood".into(),
            needs: Needs {
                water: Some(7.0),
                sunlight: Some(8.0),
                harmony: Some(6.0),
                ..Needs::default()
            },
            effects: effects(&[(T::Joy, 5.0), (T::Creativity, 4.0), (T::Healing, 3.0)]),
            companion_bonus: vec![S::CrystalLotus, S::Starbloom],
            pollination_chance: 0.35,
            offspring: vec![S::RainbowIris, S::Rose],
            repels: Vec::new(),
            rarity: Rarity::Rare,
        },
    );
    table.insert(
        S::Lavender,
        PlantSpecies {
            name: "Lavender".into(),
            emoji: "💜".into(),
            growth_stages: stages(["🌱", "🌿", "🌸", "💜"]),
            description: "Brings peace and tranquility".into(),
            needs: Needs {
                water: Some(4.0),
                sunlight: Some(9.0),
                pollination: Some(5.0),
                ..Needs::default()
            },
            effects: effects(&[(T::Harmony, 2.0), (T::RepelPests, 3.0), (T::Calm, 4.0)]),
            companion_bonus: vec![S::Rose, S::Sage],
            pollination_chance: 0.2,
            offspring: vec![S::Lavender, S::Rose],
            repels: Vec::new(),
            rarity: Rarity::Common,
        },
    );
    table.insert(
        S::Sunflower,
        PlantSpecies {
            name: "Sunflower".into(),
            emoji: "🌻".into(),
            growth_stages: stages(["🌱", "🌿", "🌼", "🌻"]),
            description: "Always follows the sun".into(),
            needs: Needs {
                water: Some(6.0),
                sunlight: Some(10.0),
                pollination: Some(7.0),
                ..Needs::default()
            },
            effects: effects(&[
                (T::Joy, 4.0),
                (T::Energy, 5.0),
                (T::AttractPollinators, 4.0),
            ]),
            companion_bonus: vec![S::PhoenixBloom, S::Sage],
            pollination_chance: 0.5,
            offspring: vec![S::Sunflower, S::RainbowIris],
            repels: vec![S::ShadowVine],
            rarity: Rarity::Common,
        },
    );
    table.insert(
        S::Sage,
        PlantSpecies {
            name: "Sage".into(),
            emoji: "🌿".into(),
            growth_stages: stages(["🌱", "🌿", "🍃", "🌿"]),
            description: "Enhances the garden's harmony".into(),
            needs: Needs {
                water: Some(5.0),
                sunlight: Some(7.0),
                pollination: Some(4.0),
                ..Needs::default()
            },
            effects: effects(&[
                (T::Purification, 3.0),
                (T::RepelPests, 4.0),
                (T::Wisdom, 2.0),
            ]),
            companion_bonus: vec![S::Lavender, S::Sunflower],
            pollination_chance: 0.15,
            offspring: vec![S::Sage, S::Lavender],
            repels: Vec::new(),
            rarity: Rarity::Common,
        },
    );
    table.insert(
        S::ShadowVine,
        PlantSpecies {
            name: "Shadow Vine".into(),
            emoji: "🕸️".into(),
            growth_stages: stages(["🌱", "🕸️", "🌑", "🕸️"]),
            description: "Creeps silently through the night".into(),
            needs: Needs {
                moonlight: Some(7.0),
                magic: Some(5.0),
                water: Some(3.0),
                ..Needs::default()
            },
            effects: effects(&[(T::Mystery, 4.0), (T::Dreams, 3.0), (T::RepelLight, 2.0)]),
            companion_bonus: vec![S::Moonflower, S::CrystalLotus],
            pollination_chance: 0.1,
            offspring: vec![S::ShadowVine],
            repels: Vec::new(),
            rarity: Rarity::Rare,
        },
    );
    table.insert(
        S::Thistle,
        PlantSpecies {
            name: "Thistle".into(),
            emoji: "🌾".into(),
            growth_stages: stages(["🌱", "🌾", "🥀", "🌾"]),
            description: "Protects the garden from unwanted visitors".into(),
            needs: Needs {
                water: Some(3.0),
                sunlight: Some(6.0),
                pollination: Some(2.0),
                ..Needs::default()
            },
            effects: effects(&[
                (T::RepelPests, 5.0),
                (T::Protection, 3.0),
                (T::Resilience, 2.0),
            ]),
            companion_bonus: vec![S::Rose],
            pollination_chance: 0.05,
            offspring: vec![S::Thistle],
            repels: Vec::new(),
            rarity: Rarity::Common,
        },
    );
    table
}

fn combo(id: &str, plants: [Species; 2], message: &str, achievement: &str) -> SpecialCombination {
    SpecialCombination {
        id: id.into(),
        plants: plants.to_vec(),
        message: message.into(),
        achievement: achievement.into(),
    }
}

fn builtin_combinations() -> Vec<SpecialCombination> {
    use Species as S;
    vec![
        combo(
            "ROSE_MOONFLOWER",
            [S::Rose, S::Moonflower],
            "Your smile lights up even the darkest night",
            "Moonlit Wonder",
        ),
        combo(
            "CRYSTAL_STARBLOOM",
            [S::CrystalLotus, S::Starbloom],
            "You make ordinary moments feel magical",
            "Stellar Spirit",
        ),
        combo(
            "RAINBOW_PHOENIX",
            [S::RainbowIris, S::PhoenixBloom],
            "Every story is more fun when you tell it",
            "Storyteller",
        ),
        combo(
            "DRAGON_CRYSTAL",
            [S::DragonSnap, S::CrystalLotus],
            "The smartest person I know",
            "Humble Genius",
        ),
        combo(
            "LAVENDER_SAGE",
            [S::Lavender, S::Sage],
            "You're funny once in a while",
            "Queen of Smiles",
        ),
        combo(
            "SUNFLOWER_PHOENIX",
            [S::Sunflower, S::PhoenixBloom],
            "You inspire others to shine their brightest",
            "Radiant Soul",
        ),
        combo(
            "MOONFLOWER_SHADOW",
            [S::Moonflower, S::ShadowVine],
            "Never misses with a camera",
            "Photogenic",
        ),
        combo(
            "RAINBOW_CRYSTAL",
            [S::RainbowIris, S::CrystalLotus],
            "You're a fruit cup!",
            "Prism Heart",
        ),
        combo(
            "DRAGON_PHOENIX",
            [S::DragonSnap, S::PhoenixBloom],
            "Keep that fearsome face on",
            "Scare Them Away!",
        ),
        combo(
            "STARBLOOM_MOONFLOWER",
            [S::Starbloom, S::Moonflower],
            "You have a glow that puts the stars to shame",
            "Star Girl",
        ),
        combo("ROSE_LAVENDER", [S::Rose, S::Lavender], "🌹", "Mwaaah"),
        combo(
            "SAGE_CRYSTAL",
            [S::Sage, S::CrystalLotus],
            "Your wisdom and kindness are truly remarkable",
            "Kind Spirit",
        ),
        combo(
            "SUNFLOWER_RAINBOW",
            [S::Sunflower, S::RainbowIris],
            "Your sweet gaze melts my heart",
            "Loving Gaze",
        ),
        combo(
            "DRAGON_MOONFLOWER",
            [S::DragonSnap, S::Moonflower],
            "Nothing ever goes to waste with you around",
            "Resourceful",
        ),
        combo(
            "CRYSTAL_SHADOW",
            [S::CrystalLotus, S::ShadowVine],
            "Fearless in the face of the unknown",
            "Brave Heart",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_validates() {
        let catalog = PlantCatalog::default();
        catalog.validate().unwrap();
        assert_eq!(catalog.species().count(), Species::ALL.len());
        assert_eq!(catalog.combinations().len(), 15);
    }

    #[test]
    fn declared_needs_skip_undeclared() {
        let rose = PlantCatalog::default().get(Species::Rose).needs.clone();
        let declared: Vec<_> = rose.declared().map(|(k, _)| k).collect();
        assert_eq!(
            declared,
            vec![NeedKind::Water, NeedKind::Sunlight, NeedKind::Pollination]
        );
    }

    #[test]
    fn json_roundtrip_revalidates() {
        let json = PlantCatalog::default().to_json().unwrap();
        let restored = PlantCatalog::from_json(&json).unwrap();
        assert_eq!(restored.get(Species::Moonflower).rarity, Rarity::Rare);
        assert!(restored.combinations().iter().any(|c| c.id == "ROSE_MOONFLOWER"));
    }

    #[test]
    fn rejects_missing_species() {
        let mut species = builtin_species();
        species.remove(&Species::Thistle);
        let err = PlantCatalog::new(species, builtin_combinations()).unwrap_err();
        assert!(matches!(err, CatalogError::MissingSpecies(Species::Thistle)));
    }

    #[test]
    fn rejects_bad_pollination_chance() {
        let mut species = builtin_species();
        species.get_mut(&Species::Rose).unwrap().pollination_chance = 1.5;
        let err = PlantCatalog::new(species, Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InvalidSpecies {
                species: Species::Rose,
                ..
            }
        ));
    }

    #[test]
    fn rejects_single_species_combination() {
        let combos = vec![combo(
            "SOLO",
            [Species::Rose, Species::Rose],
            "alone",
            "Solo",
        )];
        let err = PlantCatalog::new(builtin_species(), combos).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidCombination { .. }));
    }

    #[test]
    fn rejects_unknown_trait_in_json() {
        let mut value = serde_json::to_value(PlantCatalog::default()).unwrap();
        value["species"]["ROSE"]["effects"]["sparkle"] = serde_json::json!(1.0);
        let err = PlantCatalog::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }
}
