//! Achievement catalog and lifetime progress counters.
//!
//! Counters are cumulative for the whole game: harvesting a slot resets
//! the slot, never the counters. The economy only records and rewards
//! achievements; deciding which ones are earned happens here and is
//! driven by the engine.

use serde::{Deserialize, Serialize};

/// Lifetime totals. Never decremented.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressCounters {
    pub plants_placed:    u64,
    pub waterings:        u64,
    pub fertilizations:   u64,
    pub harvests:         u64,
    pub bouquets_created: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementTrigger {
    PlantsPlaced(u64),
    Harvests(u64),
    BouquetsCreated(u64),
    LevelReached(u32),
}

impl AchievementTrigger {
    pub fn is_met(&self, counters: &ProgressCounters, level: u32) -> bool {
        match *self {
            Self::PlantsPlaced(n)    => counters.plants_placed >= n,
            Self::Harvests(n)        => counters.harvests >= n,
            Self::BouquetsCreated(n) => counters.bouquets_created >= n,
            Self::LevelReached(n)    => level >= n,
        }
    }
}

/// Static description of a single achievement.
pub struct AchievementDef {
    pub id:          &'static str,
    pub name:        &'static str,
    pub description: &'static str,
    pub trigger:     AchievementTrigger,
}

pub const ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef {
        id: "first_sprout",
        name: "First Sprout",
        description: "Plant your first seed",
        trigger: AchievementTrigger::PlantsPlaced(1),
    },
    AchievementDef {
        id: "green_thumb",
        name: "Green Thumb",
        description: "Plant 10 seeds",
        trigger: AchievementTrigger::PlantsPlaced(10),
    },
    AchievementDef {
        id: "first_bloom",
        name: "First Bloom",
        description: "Harvest your first flower",
        trigger: AchievementTrigger::Harvests(1),
    },
    AchievementDef {
        id: "bountiful",
        name: "Bountiful",
        description: "Harvest 25 flowers",
        trigger: AchievementTrigger::Harvests(25),
    },
    AchievementDef {
        id: "florist",
        name: "Florist",
        description: "Create your first bouquet",
        trigger: AchievementTrigger::BouquetsCreated(1),
    },
    AchievementDef {
        id: "seasoned_gardener",
        name: "Seasoned Gardener",
        description: "Reach level 5",
        trigger: AchievementTrigger::LevelReached(5),
    },
];

pub fn find(id: &str) -> Option<&'static AchievementDef> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Ids of every achievement whose trigger is satisfied, in catalog order.
/// Includes ones already unlocked; unlocking is idempotent.
pub fn earned(counters: &ProgressCounters, level: u32) -> impl Iterator<Item = &'static str> + '_ {
    ACHIEVEMENTS
        .iter()
        .filter(move |a| a.trigger.is_met(counters, level))
        .map(|a| a.id)
}
