//! Economy and progression: coins, experience, level, harvested
//! inventory and achievements.
//!
//! RULES:
//!   - Coins never go below zero. A failed deduction leaves state untouched.
//!   - Experience never decreases. Level is always derived from it and
//!     is never stored on its own.
//!   - Each achievement is rewarded at most once.

use crate::{
    catalog::SeedDefinition,
    error::{GardenError, GardenResult},
    lifecycle::HarvestOutcome,
    types::SeedId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const EXPERIENCE_PER_LEVEL: u64 = 100;
pub const PLANT_EXPERIENCE: u64 = 2;
pub const WATER_EXPERIENCE: u64 = 3;
pub const FERTILIZE_EXPERIENCE: u64 = 5;
/// Harvest value bonus per level above 1.
pub const LEVEL_VALUE_STEP: f64 = 0.05;
/// Coins per level granted when the level increases.
pub const LEVEL_UP_BONUS_PER_LEVEL: u64 = 10;
pub const ACHIEVEMENT_BONUS: u64 = 50;
/// Share of the harvest sell price a flower is worth in a bouquet.
pub const BOUQUET_PRICE_FACTOR: f64 = 0.8;

/// Floor a coin amount, absorbing float noise such as 23.999999999999996.
fn floor_coins(value: f64) -> u64 {
    (value + 1e-9).floor().max(0.0) as u64
}

/// `floor(experience / 100) + 1`.
pub fn level_for(experience: u64) -> u32 {
    (experience / EXPERIENCE_PER_LEVEL + 1) as u32
}

/// Harvested flowers of one seed type waiting to go into bouquets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryEntry {
    pub seed_id:    SeedId,
    pub name:       String,
    pub count:      u32,
    /// Bouquet value of one flower.
    pub unit_price: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelUp {
    pub from:  u32,
    pub to:    u32,
    pub bonus: u64,
}

/// What ApplyHarvestOutcome credited.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestReceipt {
    pub coins_earned: u64,
    pub experience:   u64,
    pub unit_price:   u64,
    pub level_up:     Option<LevelUp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    Unlocked { bonus: u64 },
    AlreadyUnlocked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EconomyState {
    coins:        u64,
    experience:   u64,
    inventory:    BTreeMap<SeedId, InventoryEntry>,
    achievements: BTreeSet<String>,
}

impl EconomyState {
    pub fn new(starting_coins: u64) -> Self {
        Self {
            coins:        starting_coins,
            experience:   0,
            inventory:    BTreeMap::new(),
            achievements: BTreeSet::new(),
        }
    }

    /// Rebuild from persisted parts. Level is recomputed, never trusted.
    pub(crate) fn from_parts(
        coins:        u64,
        experience:   u64,
        inventory:    impl IntoIterator<Item = InventoryEntry>,
        achievements: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            coins,
            experience,
            inventory: inventory
                .into_iter()
                .filter(|e| e.count > 0)
                .map(|e| (e.seed_id.clone(), e))
                .collect(),
            achievements: achievements.into_iter().collect(),
        }
    }

    pub fn coins(&self) -> u64 { self.coins }
    pub fn experience(&self) -> u64 { self.experience }
    pub fn level(&self) -> u32 { level_for(self.experience) }

    pub fn inventory(&self) -> impl Iterator<Item = &InventoryEntry> {
        self.inventory.values()
    }

    pub fn inventory_entry(&self, seed_id: &str) -> Option<&InventoryEntry> {
        self.inventory.get(seed_id)
    }

    pub fn flower_count(&self) -> u32 {
        self.inventory.values().map(|e| e.count).sum()
    }

    pub fn achievements(&self) -> impl Iterator<Item = &String> {
        self.achievements.iter()
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.contains(id)
    }

    // ── Spending ──────────────────────────────────────────────

    /// Deduct the seed cost. Fails without mutation when coins are short.
    pub fn apply_plant_cost(&mut self, seed: &SeedDefinition) -> GardenResult<u64> {
        self.spend_coins(seed.cost)?;
        Ok(seed.cost)
    }

    pub fn spend_coins(&mut self, amount: u64) -> GardenResult<()> {
        if self.coins < amount {
            return Err(GardenError::InsufficientFunds {
                required:  amount,
                available: self.coins,
            });
        }
        self.coins -= amount;
        Ok(())
    }

    pub fn add_coins(&mut self, amount: u64) {
        self.coins = self.coins.saturating_add(amount);
    }

    // ── Progression ───────────────────────────────────────────

    /// Credit a harvest. `current_level` is the level before the harvest
    /// and drives the value multiplier; the level-up bonus uses the level
    /// reached afterwards.
    pub fn apply_harvest_outcome(
        &mut self,
        outcome:       &HarvestOutcome,
        current_level: u32,
    ) -> HarvestReceipt {
        let multiplier = 1.0 + current_level.saturating_sub(1) as f64 * LEVEL_VALUE_STEP;
        let coins_earned = floor_coins(outcome.sell_price * multiplier);
        self.add_coins(coins_earned);

        let level_up = self.gain_experience(outcome.experience_yield);

        let unit_price = floor_coins(outcome.sell_price * BOUQUET_PRICE_FACTOR);
        let entry = self
            .inventory
            .entry(outcome.seed.id.clone())
            .or_insert_with(|| InventoryEntry {
                seed_id:    outcome.seed.id.clone(),
                name:       outcome.seed.name.clone(),
                count:      0,
                unit_price,
            });
        entry.count += 1;
        let unit_price = entry.unit_price;

        HarvestReceipt {
            coins_earned,
            experience: outcome.experience_yield,
            unit_price,
            level_up,
        }
    }

    /// Flat experience for planting, watering and fertilizing.
    pub fn apply_action_experience(&mut self, amount: u64) -> Option<LevelUp> {
        self.gain_experience(amount)
    }

    fn gain_experience(&mut self, amount: u64) -> Option<LevelUp> {
        let before = self.level();
        self.experience = self.experience.saturating_add(amount);
        let after = self.level();
        if after > before {
            let bonus = after as u64 * LEVEL_UP_BONUS_PER_LEVEL;
            self.add_coins(bonus);
            Some(LevelUp { from: before, to: after, bonus })
        } else {
            None
        }
    }

    // ── Achievements ──────────────────────────────────────────

    pub fn unlock_achievement(&mut self, id: &str) -> UnlockOutcome {
        if self.achievements.contains(id) {
            return UnlockOutcome::AlreadyUnlocked;
        }
        self.achievements.insert(id.to_string());
        self.add_coins(ACHIEVEMENT_BONUS);
        UnlockOutcome::Unlocked { bonus: ACHIEVEMENT_BONUS }
    }

    // ── Inventory ─────────────────────────────────────────────

    /// Remove flowers for a bouquet. All picks are checked before any
    /// count changes.
    pub(crate) fn take_flowers(&mut self, picks: &[(SeedId, u32)]) -> GardenResult<()> {
        let mut wanted: BTreeMap<&str, u32> = BTreeMap::new();
        for (seed_id, count) in picks {
            let available = self.inventory.get(seed_id).map_or(0, |e| e.count);
            let wanted_count = wanted.entry(seed_id.as_str()).or_default();
            *wanted_count = wanted_count
                .checked_add(*count)
                .ok_or_else(|| GardenError::NotEnoughFlowers {
                    seed_id:   seed_id.clone(),
                    requested: u32::MAX,
                    available,
                })?;
        }
        for (seed_id, requested) in &wanted {
            let available = self.inventory.get(*seed_id).map_or(0, |e| e.count);
            if available < *requested {
                return Err(GardenError::NotEnoughFlowers {
                    seed_id:   seed_id.to_string(),
                    requested: *requested,
                    available,
                });
            }
        }
        for (seed_id, requested) in wanted {
            if let Some(entry) = self.inventory.get_mut(seed_id) {
                entry.count -= requested;
                if entry.count == 0 {
                    self.inventory.remove(seed_id);
                }
            }
        }
        Ok(())
    }
}
