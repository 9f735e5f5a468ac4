// Resource pool: water, magic and per-tier seeds.
//
// Every player action is gated here. Spending checks the balance first and
// changes nothing on failure. Per-tick regeneration adds water and magic
// (more during rain and magical mist) and rolls one seed per tier. Seed
// counts never exceed their tier's cap, including after a refund.
//
// **Critical constraint: determinism.** `regenerate()` draws exactly one
// random value per tier per tick, in `Rarity::ALL` order, whether or not the
// tier is full.

use crate::command::CommandError;
use crate::config::GameConfig;
use crate::types::{Rarity, WeatherKind};
use enchanted_garden_prng::RandomSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Seed counts keyed by tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedBank(BTreeMap<Rarity, u32>);

impl SeedBank {
    pub fn from_config(config: &GameConfig) -> Self {
        Self(
            Rarity::ALL
                .into_iter()
                .map(|tier| (tier, config.rarity(tier).initial_seeds))
                .collect(),
        )
    }

    pub fn count(&self, tier: Rarity) -> u32 {
        self.0.get(&tier).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Rarity, u32)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    fn set(&mut self, tier: Rarity, count: u32) {
        self.0.insert(tier, count);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub water: f32,
    pub magic: f32,
    pub seeds: SeedBank,
}

impl ResourcePool {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            water: config.economy.initial_water,
            magic: config.economy.initial_magic,
            seeds: SeedBank::from_config(config),
        }
    }

    /// One tick of regeneration under the given weather.
    pub fn regenerate(
        &mut self,
        weather: WeatherKind,
        config: &GameConfig,
        rng: &mut impl RandomSource,
    ) {
        let econ = &config.economy;
        let water_gain = if weather == WeatherKind::Rainy {
            econ.rainy_water_regen
        } else {
            econ.water_regen
        };
        let magic_gain = if weather == WeatherKind::MagicalMist {
            econ.misty_magic_regen
        } else {
            econ.magic_regen
        };
        self.water = (self.water + water_gain).min(econ.pool_max);
        self.magic = (self.magic + magic_gain).min(econ.pool_max);

        for tier in Rarity::ALL {
            let params = config.rarity(tier);
            let roll = rng.chance(params.seed_regen_chance);
            if roll {
                let count = self.seeds.count(tier);
                self.seeds.set(tier, (count + 1).min(params.seed_cap));
            }
        }
    }

    pub fn spend_seed(&mut self, tier: Rarity) -> Result<(), CommandError> {
        let count = self.seeds.count(tier);
        if count == 0 {
            return Err(CommandError::InsufficientSeeds { rarity: tier });
        }
        self.seeds.set(tier, count - 1);
        Ok(())
    }

    /// Return one seed, never lifting the tier above its cap.
    pub fn refund_seed(&mut self, tier: Rarity, config: &GameConfig) {
        let cap = config.rarity(tier).seed_cap;
        let count = self.seeds.count(tier);
        self.seeds.set(tier, (count + 1).min(cap));
    }

    pub fn spend_water(&mut self, amount: f32) -> Result<(), CommandError> {
        if self.water < amount {
            return Err(CommandError::InsufficientWater);
        }
        self.water -= amount;
        Ok(())
    }

    pub fn can_spend_magic(&self, amount: f32) -> bool {
        self.magic >= amount
    }

    pub fn spend_magic(&mut self, amount: f32) -> Result<(), CommandError> {
        if !self.can_spend_magic(amount) {
            return Err(CommandError::InsufficientResource);
        }
        self.magic -= amount;
        Ok(())
    }
}
