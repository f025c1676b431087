//! Outbound events. The one-way observation channel for the UI and
//! telemetry.
//!
//! RULE: every committed action emits at least one event; rejected
//! actions emit none. Nothing in the core reacts to these.
//! Variants are only ever appended.

use crate::{
    bouquet::BouquetSize,
    slot::Stage,
    types::{ProfileId, SlotIndex, Timestamp},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GardenEvent {
    // ── Lifecycle ──────────────────────────────────────────
    SeedPlanted {
        at:         Timestamp,
        slot:       SlotIndex,
        seed_id:    String,
        cost:       u64,
        ready_at:   Timestamp,
        experience: u64,
    },
    PlantWatered {
        at:         Timestamp,
        slot:       SlotIndex,
        stage:      Stage,
        ready_at:   Timestamp,
        health:     u8,
        experience: u64,
    },
    PlantFertilized {
        at:         Timestamp,
        slot:       SlotIndex,
        ready_at:   Timestamp,
        experience: u64,
    },
    FlowerHarvested {
        at:                Timestamp,
        slot:              SlotIndex,
        seed_id:           String,
        coins_earned:      u64,
        experience:        u64,
        health_at_harvest: u8,
        unit_price:        u64,
    },

    // ── Progression ────────────────────────────────────────
    LevelUp {
        at:    Timestamp,
        level: u32,
        bonus: u64,
    },
    AchievementUnlocked {
        at:          Timestamp,
        achievement: String,
        bonus:       u64,
    },

    // ── Spending and bouquets ──────────────────────────────
    CoinsSpent {
        at:     Timestamp,
        amount: u64,
        reason: String,
    },
    BouquetCreated {
        at:          Timestamp,
        bouquet_id:  String,
        size:        BouquetSize,
        flowers:     u32,
        wrapper_id:  String,
        total_value: u64,
    },
    BouquetSold {
        at:           Timestamp,
        bouquet_id:   String,
        coins_earned: u64,
    },
}

impl GardenEvent {
    /// Stable name used for the event_type column of the event log.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SeedPlanted { .. }         => "seed_planted",
            Self::PlantWatered { .. }        => "plant_watered",
            Self::PlantFertilized { .. }     => "plant_fertilized",
            Self::FlowerHarvested { .. }     => "flower_harvested",
            Self::LevelUp { .. }             => "level_up",
            Self::AchievementUnlocked { .. } => "achievement_unlocked",
            Self::CoinsSpent { .. }          => "coins_spent",
            Self::BouquetCreated { .. }      => "bouquet_created",
            Self::BouquetSold { .. }         => "bouquet_sold",
        }
    }

    pub fn at(&self) -> Timestamp {
        match self {
            Self::SeedPlanted { at, .. }
            | Self::PlantWatered { at, .. }
            | Self::PlantFertilized { at, .. }
            | Self::FlowerHarvested { at, .. }
            | Self::LevelUp { at, .. }
            | Self::AchievementUnlocked { at, .. }
            | Self::CoinsSpent { at, .. }
            | Self::BouquetCreated { at, .. }
            | Self::BouquetSold { at, .. } => *at,
        }
    }

    /// Slot the event concerns, if any.
    pub fn slot(&self) -> Option<SlotIndex> {
        match self {
            Self::SeedPlanted { slot, .. }
            | Self::PlantWatered { slot, .. }
            | Self::PlantFertilized { slot, .. }
            | Self::FlowerHarvested { slot, .. } => Some(*slot),
            _ => None,
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub profile_id: ProfileId,
    pub at:         Timestamp,
    pub event_type: String,
    pub payload:    String, // JSON-serialized GardenEvent
}
