//! Seed and wrapper catalogs.
//!
//! The catalog is supplied from outside the core and is read-only once
//! built. Slots hold an `Arc` to their entry; entries are never copied
//! and mutated.

use crate::{
    error::{GardenError, GardenResult},
    types::SeedId,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
}

/// An immutable catalog entry describing one kind of seed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeedDefinition {
    pub id:               SeedId,
    pub name:             String,
    /// Coins deducted when planting.
    pub cost:             u64,
    /// Base duration of each growth step, in milliseconds.
    pub growth_time:      u64,
    /// Base coins paid out at harvest, before health and level multipliers.
    pub sell_price:       u64,
    pub rarity:           Rarity,
    /// Experience granted by harvesting one flower.
    pub experience_yield: u64,
}

/// Ordered list of seeds. Order is the display order of the shop.
#[derive(Debug, Clone, Default)]
pub struct SeedCatalog {
    seeds: Vec<Arc<SeedDefinition>>,
}

impl SeedCatalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn new(seeds: Vec<SeedDefinition>) -> GardenResult<Self> {
        let mut out: Vec<Arc<SeedDefinition>> = Vec::with_capacity(seeds.len());
        for seed in seeds {
            if out.iter().any(|s| s.id == seed.id) {
                return Err(anyhow::anyhow!("duplicate seed id '{}' in catalog", seed.id).into());
            }
            out.push(Arc::new(seed));
        }
        Ok(Self { seeds: out })
    }

    /// The five flowers the game ships with.
    pub fn builtin() -> Self {
        let entry = |id: &str, name: &str, cost: u64, growth_time: u64, rarity: Rarity, experience_yield: u64| SeedDefinition {
            id: id.into(),
            name: name.into(),
            cost,
            growth_time,
            sell_price: cost * 2,
            rarity,
            experience_yield,
        };
        Self {
            seeds: vec![
                Arc::new(entry("daisy", "Daisy", 6, 13_000, Rarity::Common, 6)),
                Arc::new(entry("tulip", "Tulip", 8, 14_000, Rarity::Common, 8)),
                Arc::new(entry("rose", "Rose", 10, 15_000, Rarity::Uncommon, 10)),
                Arc::new(entry("sunflower", "Sunflower", 12, 16_000, Rarity::Uncommon, 12)),
                Arc::new(entry("lily", "Lily", 15, 17_000, Rarity::Rare, 15)),
            ],
        }
    }

    pub fn get(&self, seed_id: &str) -> GardenResult<Arc<SeedDefinition>> {
        self.seeds
            .iter()
            .find(|s| s.id == seed_id)
            .cloned()
            .ok_or_else(|| GardenError::UnknownSeed { seed_id: seed_id.to_string() })
    }

    pub fn contains(&self, seed_id: &str) -> bool {
        self.seeds.iter().any(|s| s.id == seed_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SeedDefinition>> {
        self.seeds.iter()
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    /// Seeds the player can currently afford.
    pub fn affordable(&self, coins: u64) -> Vec<Arc<SeedDefinition>> {
        self.seeds.iter().filter(|s| s.cost <= coins).cloned().collect()
    }
}

/// Bouquet wrapping, paid for with coins when the bouquet is made.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WrapperOption {
    pub id:   String,
    pub name: String,
    pub cost: u64,
}

pub fn builtin_wrappers() -> Vec<WrapperOption> {
    vec![
        WrapperOption { id: "basic".into(),   name: "Basic Paper".into(), cost: 0 },
        WrapperOption { id: "deluxe".into(),  name: "Silk Ribbon".into(), cost: 5 },
        WrapperOption { id: "premium".into(), name: "Luxury Box".into(),  cost: 10 },
    ]
}
