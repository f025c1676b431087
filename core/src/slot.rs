//! Garden slots and the grid that owns them.
//!
//! RULE: a slot is Empty iff it has no seed, no planted_at and no
//! next_ready_at. `fertilized` is true iff the slot is Mature.
//! Only lifecycle.rs produces new slot states; everything else reads.

use crate::{
    catalog::SeedDefinition,
    error::{GardenError, GardenResult},
    types::{SlotIndex, Timestamp, GRID_SIZE},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const MAX_HEALTH: u8 = 100;

/// Position in the fixed growth sequence.
/// Empty → Planted → Sprouting → Growing → ReadyToFertilize → Mature → Empty.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Empty,
    Planted,
    Sprouting,
    Growing,
    ReadyToFertilize,
    Mature,
}

impl Stage {
    /// The stage a watering moves to, or None when the stage cannot be watered.
    pub fn after_watering(self) -> Option<Stage> {
        match self {
            Self::Planted          => Some(Self::Sprouting),
            Self::Sprouting        => Some(Self::Growing),
            Self::Growing          => Some(Self::ReadyToFertilize),
            Self::Empty
            | Self::ReadyToFertilize
            | Self::Mature         => None,
        }
    }

    pub fn is_waterable(self) -> bool {
        self.after_watering().is_some()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Empty            => "empty",
            Self::Planted          => "planted",
            Self::Sprouting        => "sprouting",
            Self::Growing          => "growing",
            Self::ReadyToFertilize => "ready_to_fertilize",
            Self::Mature           => "mature",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub(crate) index:         SlotIndex,
    pub(crate) stage:         Stage,
    pub(crate) seed:          Option<Arc<SeedDefinition>>,
    pub(crate) planted_at:    Option<Timestamp>,
    pub(crate) next_ready_at: Option<Timestamp>,
    pub(crate) fertilized:    bool,
    pub(crate) health:        u8,
}

impl Slot {
    pub fn empty(index: SlotIndex) -> Self {
        Self {
            index,
            stage: Stage::Empty,
            seed: None,
            planted_at: None,
            next_ready_at: None,
            fertilized: false,
            health: MAX_HEALTH,
        }
    }

    /// Rebuild a slot from persisted parts. Returns None if the parts
    /// violate any slot invariant.
    pub fn from_parts(
        index:         SlotIndex,
        stage:         Stage,
        seed:          Option<Arc<SeedDefinition>>,
        planted_at:    Option<Timestamp>,
        next_ready_at: Option<Timestamp>,
        fertilized:    bool,
        health:        u8,
    ) -> Option<Self> {
        let slot = Self { index, stage, seed, planted_at, next_ready_at, fertilized, health };
        slot.is_consistent().then_some(slot)
    }

    pub fn index(&self) -> SlotIndex { self.index }
    pub fn stage(&self) -> Stage { self.stage }
    pub fn seed(&self) -> Option<&Arc<SeedDefinition>> { self.seed.as_ref() }
    pub fn planted_at(&self) -> Option<Timestamp> { self.planted_at }
    pub fn next_ready_at(&self) -> Option<Timestamp> { self.next_ready_at }
    pub fn fertilized(&self) -> bool { self.fertilized }
    pub fn health(&self) -> u8 { self.health }

    pub fn is_empty(&self) -> bool {
        self.stage == Stage::Empty
    }

    /// Inclusive readiness gate: exactly-at-boundary counts as ready.
    pub fn is_ready(&self, now: Timestamp) -> bool {
        self.next_ready_at.is_some_and(|t| now >= t)
    }

    /// Milliseconds left on the readiness timer (0 when ready or empty).
    pub fn remaining_ms(&self, now: Timestamp) -> u64 {
        self.next_ready_at.map_or(0, |t| t.saturating_sub(now))
    }

    pub fn is_consistent(&self) -> bool {
        let empty = self.stage == Stage::Empty;
        let all_absent =
            self.seed.is_none() && self.planted_at.is_none() && self.next_ready_at.is_none();
        let all_present =
            self.seed.is_some() && self.planted_at.is_some() && self.next_ready_at.is_some();

        if empty != all_absent || (!empty && !all_present) {
            return false;
        }
        if self.fertilized != (self.stage == Stage::Mature) {
            return false;
        }
        if self.health > MAX_HEALTH {
            return false;
        }
        match (self.planted_at, self.next_ready_at) {
            (Some(planted), Some(ready)) => planted <= ready,
            _ => true,
        }
    }
}

/// The fixed grid of slots. Slots are never added or removed, only reset.
#[derive(Debug, Clone, PartialEq)]
pub struct Garden {
    slots: Vec<Slot>,
}

impl Garden {
    pub fn new() -> Self {
        Self { slots: (0..GRID_SIZE).map(Slot::empty).collect() }
    }

    /// Build from exactly GRID_SIZE slots whose indices match their positions.
    pub(crate) fn from_slots(slots: Vec<Slot>) -> Option<Self> {
        let valid = slots.len() == GRID_SIZE
            && slots.iter().enumerate().all(|(i, s)| s.index == i && s.is_consistent());
        valid.then_some(Self { slots })
    }

    pub fn slot(&self, index: SlotIndex) -> GardenResult<&Slot> {
        self.slots
            .get(index)
            .ok_or(GardenError::SlotOutOfRange { slot: index })
    }

    /// Commit a new state for the slot at its own index.
    pub(crate) fn commit(&mut self, slot: Slot) {
        debug_assert!(slot.is_consistent(), "committing inconsistent slot {slot:?}");
        let index = slot.index;
        self.slots[index] = slot;
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn planted_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }

    pub fn first_empty(&self) -> Option<SlotIndex> {
        self.slots.iter().find(|s| s.is_empty()).map(|s| s.index)
    }
}

impl Default for Garden {
    fn default() -> Self { Self::new() }
}
